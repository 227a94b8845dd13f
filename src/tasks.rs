// src/tasks.rs

use actix_web::{web, HttpRequest, HttpResponse};

use crate::app_state::AppState;
use crate::codec::{decode_json, decode_path_id};
use crate::dispatch::{dispatch, Operation};
use crate::error::GatewayError;
use crate::models::{ListTasks, OverdueQuery, Task, UpdateTask};
use crate::query::{parse_pagination, PaginationParams};

/// Mounts the task routes under `/v1`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/v1")
            .service(
                web::scope("/tasks")
                    .route("", web::post().to(create_task))
                    .route("", web::get().to(list_tasks))
                    .route("/{id}", web::get().to(get_task))
                    .route("/{id}", web::put().to(update_task))
                    .route("/{id}", web::delete().to(delete_task)),
            )
            .route("/overduetasks", web::get().to(overdue_tasks)),
    );
}

/// POST /v1/tasks
pub async fn create_task(data: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let input = decode_json::<Task>(&body).map_err(GatewayError::from);
    dispatch(&data, Operation::CreateTask, input, |tasks, deadline, task| async move {
        tasks.create(deadline, task).await
    })
    .await
}

/// GET /v1/tasks/{id}
pub async fn get_task(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let input = decode_path_id(&path).map_err(GatewayError::from);
    dispatch(&data, Operation::GetTask, input, |tasks, deadline, id| async move {
        tasks.get(deadline, id).await
    })
    .await
}

/// GET /v1/tasks?page=&limit=
pub async fn list_tasks(data: web::Data<AppState>, req: HttpRequest) -> HttpResponse {
    let input = pagination_from_query(&req, &data);
    dispatch(&data, Operation::ListTasks, input, |tasks, deadline, params| async move {
        tasks
            .list(deadline, params)
            .await
            .map(|tasks| ListTasks { tasks })
    })
    .await
}

/// PUT /v1/tasks/{id}
/// The path id wins over anything the body carries.
pub async fn update_task(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> HttpResponse {
    let input = decode_path_id(&path)
        .and_then(|id| Ok(decode_json::<UpdateTask>(&body)?.into_task(id)))
        .map_err(GatewayError::from);
    dispatch(&data, Operation::UpdateTask, input, |tasks, deadline, task| async move {
        tasks.update(deadline, task).await
    })
    .await
}

/// DELETE /v1/tasks/{id}
pub async fn delete_task(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let input = decode_path_id(&path).map_err(GatewayError::from);
    dispatch(&data, Operation::DeleteTask, input, |tasks, deadline, id| async move {
        tasks.delete(deadline, id).await
    })
    .await
}

/// GET /v1/overduetasks, with the cutoff and paging in a JSON body.
pub async fn overdue_tasks(data: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    let input = decode_json::<OverdueQuery>(&body).map_err(GatewayError::from);
    dispatch(&data, Operation::OverdueTasks, input, |tasks, deadline, query| async move {
        tasks
            .overdue(deadline, query)
            .await
            .map(|tasks| ListTasks { tasks })
    })
    .await
}

fn pagination_from_query(
    req: &HttpRequest,
    data: &AppState,
) -> Result<PaginationParams, GatewayError> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map_err(|e| GatewayError::Validation(vec![format!("malformed query string: {}", e)]))?
        .into_inner();
    parse_pagination(&pairs, &data.config.pagination).map_err(GatewayError::Validation)
}
