use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::error_response;
use crate::operations::create_group::{create_group, CreateGroupInput};
use crate::operations::describe_group::describe_group;
use crate::operations::join_group::{join_group, JoinGroupInput};
use crate::session::Identity;
use crate::Context;

pub(crate) async fn create(
    ctx: web::Data<Context>,
    identity: Identity,
    input: web::Json<CreateGroupInput>,
) -> HttpResponse {
    match create_group(&identity, &ctx.groups(), input.into_inner()).await {
        Ok(output) => HttpResponse::Created().json(output),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn join(
    ctx: web::Data<Context>,
    identity: Identity,
    input: web::Json<JoinGroupInput>,
) -> HttpResponse {
    match join_group(&identity, &ctx.groups(), &ctx.memberships(), input.into_inner()).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}

pub(crate) async fn describe(
    ctx: web::Data<Context>,
    identity: Identity,
    group_id: web::Path<Uuid>,
) -> HttpResponse {
    match describe_group(
        &identity,
        &ctx.groups(),
        &ctx.memberships(),
        &ctx.accounts(),
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
