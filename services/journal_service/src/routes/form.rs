use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::error::{ErrorBadRequest, ErrorPayloadTooLarge};
use futures_util::TryStreamExt;

use crate::uploads::UploadedFile;

/// A fully buffered multipart form: text fields by name, plus any file
/// parts. Parts with a filename are files, everything else is text.
pub(crate) struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    pub async fn read(mut payload: Multipart, max_bytes: usize) -> Result<Self, actix_web::Error> {
        let mut fields = HashMap::new();
        let mut files = HashMap::new();
        let mut total = 0usize;

        while let Some(mut part) = payload.try_next().await? {
            let name = part.name().to_owned();
            let filename = part
                .content_disposition()
                .get_filename()
                .map(str::to_owned)
                .filter(|f| !f.is_empty());

            let mut data = Vec::new();
            while let Some(chunk) = part.try_next().await? {
                total += chunk.len();
                if total > max_bytes {
                    return Err(ErrorPayloadTooLarge("Upload exceeds the size limit."));
                }
                data.extend_from_slice(&chunk);
            }

            match filename {
                Some(filename) => {
                    files.insert(name, UploadedFile { filename, contents: data });
                }
                None => {
                    let value = String::from_utf8(data).map_err(|_| ErrorBadRequest("Form field is not UTF-8."))?;
                    fields.insert(name, value);
                }
            }
        }

        Ok(Self { fields, files })
    }

    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn optional_field(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}
