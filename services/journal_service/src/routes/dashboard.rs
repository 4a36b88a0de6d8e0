use actix_web::{web, HttpResponse};

use super::error_response;
use crate::operations::dashboard::dashboard as dashboard_op;
use crate::session::Identity;
use crate::Context;

pub(crate) async fn dashboard(ctx: web::Data<Context>, identity: Identity) -> HttpResponse {
    match dashboard_op(&identity, &ctx.groups(), &ctx.memberships(), &ctx.assignments(), &ctx.submissions()).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    }
}
