use actix_multipart::Multipart;
use actix_web::error::ErrorBadRequest;
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::error_response;
use super::form::FormData;
use crate::operations::create_assignment::{create_assignment, CreateAssignmentInput};
use crate::operations::describe_assignment::describe_assignment;
use crate::operations::grade_submission::{grade_submission, GradeSubmissionInput};
use crate::operations::submit_assignment::{submit_assignment, SubmitAssignmentInput};
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
    let input = CreateAssignmentInput::builder()
        .group_id(group_id)
        .title(form.field("title"))
        .description(form.field("description"))
        .due_at(form.field("dueAt"))
        .question_file(form.take_file("questionFile"))
        .build();

    Ok(
        match create_assignment(&identity, &ctx.groups(), &ctx.assignments(), &ctx.file_store, input).await {
            Ok(output) => HttpResponse::Created().json(output),
            Err(e) => error_response(&e),
        },
    )
}

pub(crate) async fn describe(
    ctx: web::Data<Context>,
    identity: Identity,
    assignment_id: web::Path<Uuid>,
) -> HttpResponse {
    match describe_assignment(
        &identity,
        &ctx.groups(),
        &ctx.memberships(),
        &ctx.assignments(),
        &ctx.submissions(),
        &ctx.accounts(),
        &assignment_id,
    )
    .await
    {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn submit(
    ctx: web::Data<Context>,
    identity: Identity,
    assignment_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = FormData::read(payload, ctx.max_payload_bytes).await?;
    let input = SubmitAssignmentInput::builder()
        .assignment_id(*assignment_id)
        .file(form.take_file("file"))
        .build();

    Ok(
        match submit_assignment(
            &identity,
            &ctx.assignments(),
            &ctx.memberships(),
            &ctx.submissions(),
            &ctx.file_store,
            input,
        )
        .await
        {
            Ok(output) => HttpResponse::Created().json(output),
            Err(e) => error_response(&e),
        },
    )
}

pub(crate) async fn grade(
    ctx: web::Data<Context>,
    identity: Identity,
    assignment_id: web::Path<Uuid>,
    input: web::Json<GradeSubmissionInput>,
) -> HttpResponse {
    match grade_submission(&identity, &ctx.assignments(), &ctx.submissions(), &assignment_id, input.into_inner()).await
    {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}
