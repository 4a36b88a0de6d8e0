use actix_web::http::header;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::error_response;
use crate::operations::generate_report::generate_report;
use crate::operations::get_timeline::get_timeline;
use crate::session::Identity;
use crate::Context;

pub(crate) async fn generate(ctx: web::Data<Context>, identity: Identity, group_id: web::Path<Uuid>) -> HttpResponse {
    match generate_report(
        &identity,
        &ctx.groups(),
        &ctx.memberships(),
        &ctx.accounts(),
        &ctx.log_entries(),
        &ctx.assignments(),
        &ctx.submissions(),
        &group_id,
    )
    .await
    {
        Ok(output) => HttpResponse::Ok()
            .content_type("application/pdf")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", output.filename),
            ))
            .body(output.pdf_bytes),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn timeline(ctx: web::Data<Context>, identity: Identity, group_id: web::Path<Uuid>) -> HttpResponse {
    match get_timeline(
        &identity,
        &ctx.groups(),
        &ctx.memberships(),
        &ctx.log_entries(),
        &ctx.assignments(),
        &group_id,
    )
    .await
    {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}
