use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};

use super::error_response;
use super::form::FormData;
use crate::operations::update_profile::{update_profile, UpdateProfileInput};
use crate::session::Identity;
use crate::Context;

pub(crate) async fn update(
    ctx: web::Data<Context>,
    identity: Identity,
    payload: Multipart,
) -> Result<HttpResponse, actix_web::Error> {
    let mut form = FormData::read(payload, ctx.max_payload_bytes).await?;
    let input = UpdateProfileInput::builder()
        .full_name(form.field("fullName"))
        .email(form.field("email"))
        .contact_details(form.optional_field("contactDetails"))
        .avatar(form.take_file("avatar"))
        .build();

    Ok(match update_profile(&identity, &ctx.accounts(), &ctx.file_store, input).await {
        Ok(output) => HttpResponse::Ok().json(output),
        Err(e) => error_response(&e),
    })
}
