use actix_web::{web, HttpRequest, HttpResponse};
use log::debug;

use crate::errors::AppError;
use crate::handlers::auth::authenticate;
use crate::models::detail::{EmployeeDetail, EmployeeDetailRequest};
use crate::models::directory::{EmployeeList, EmployeeListQuery};
use crate::state::AppState;
use crate::utils::validation::validate_payload;

fn not_found() -> AppError {
    AppError::NotFound("Employee not found".to_string())
}

pub async fn employee_detail(
    state: web::Data<AppState>,
    payload: web::Json<EmployeeDetailRequest>,
) -> Result<HttpResponse, actix_web::Error> {
    let request = payload.into_inner();
    let missing_id = || AppError::BadRequest("Employee ID is required".to_string());
    validate_payload(&request).map_err(|_| missing_id())?;
    let employee_id = request.employee_id.ok_or_else(missing_id)?;

    let record = state
        .employees
        .find_employee(employee_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(EmployeeDetail::build(
        record,
        request.include_resume,
        request.include_skills,
    )))
}

pub async fn get_employees(
    state: web::Data<AppState>,
    query: web::Query<EmployeeListQuery>,
) -> Result<HttpResponse, actix_web::Error> {
    let filter = query.filter();
    let page = state
        .employees
        .list_employees(&filter, query.page, query.limit)
        .await?;
    debug!("Listed {} of {} employees for {:?}", page.records.len(), page.total, filter);

    Ok(HttpResponse::Ok().json(EmployeeList::from(page)))
}

pub async fn get_employee_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    employee_id: web::Path<i32>,
) -> Result<HttpResponse, actix_web::Error> {
    authenticate(&req, &state).await?;

    let record = state
        .employees
        .find_employee(employee_id.into_inner())
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(record.to_profile()))
}
