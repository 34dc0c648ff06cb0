//! Admin API 任务查询

use actix_web::{Responder, Result as ActixResult, web};
use std::sync::Arc;
use tracing::trace;

use crate::services::TaskService;

use super::helpers::api_result;

pub async fn get_task_summary(
    path: web::Path<String>,
    service: web::Data<Arc<TaskService>>,
) -> ActixResult<impl Responder> {
    let task_id = path.into_inner();
    trace!("Admin API: summary of task {}", task_id);
    Ok(api_result(service.task_summary(&task_id).await))
}
