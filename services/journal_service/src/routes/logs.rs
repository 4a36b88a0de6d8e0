use actix_multipart::Multipart;
use actix_web::error::ErrorBadRequest;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::error_response;
use super::form::FormData;
use crate::operations::add_feedback::{add_feedback, AddFeedbackInput};
use crate::operations::create_log::{create_log, CreateLogInput};
use crate::operations::describe_log::describe_log;
use crate::session::Identity;
use crate::Context;

pub(crate) async fn create(
    ctx: web::Data<Context>,
    identity: Identity,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = FormData::read(payload, ctx.max_payload_bytes).await?;
    let group_id: Uuid = form
        .field("groupId")
        .parse()
        .map_err(|_| ErrorBadRequest("groupId must be a UUID."))?;
    let input = CreateLogInput::builder()
        .group_id(group_id)
        .title(form.field("title"))
        .body(form.field("body"))
        .media(form.take_file("media"))
        .build();

    Ok(
        match create_log(&identity, &ctx.groups(), &ctx.memberships(), &ctx.log_entries(), &ctx.file_store, input)
            .await
        {
            Ok(output) => HttpResponse::Created().json(output),
            Err(e) => error_response(&e),
        },
    )
}

pub(crate) async fn describe(ctx: web::Data<Context>, identity: Identity, log_id: web::Path<Uuid>) -> HttpResponse {
    match describe_log(&identity, &ctx.groups(), &ctx.log_entries(), &ctx.feedback(), &ctx.accounts(), &log_id).await
    {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn feedback(
    ctx: web::Data<Context>,
    identity: Identity,
    log_id: web::Path<Uuid>,
    input: web::Json<AddFeedbackInput>,
) -> HttpResponse {
    match add_feedback(
        &identity,
        &ctx.groups(),
        &ctx.log_entries(),
        &ctx.feedback(),
        &log_id,
        input.into_inner(),
    )
    .await
    {
        Ok(output) => HttpResponse::Created().json(output),
        Err(e) => error_response(&e),
    }
}
