//! `upload` command handler.

use std::path::PathBuf;

use lvhttp_client::UploadPart;
use lvhttp_core::RequestResult;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{JsonResponse, capture, finish};
use crate::presentation::print_data;

/// Upload `files` under `field`, plus `text` parts, on a view-model scope.
///
/// Files are read inside the producer, so a missing file is classified and
/// reported like any other request failure.
pub async fn execute(
    ctx: &CliContext,
    path: &str,
    files: Vec<PathBuf>,
    field: String,
    text: Vec<(String, String)>,
) -> Result<(), CliError> {
    let scope = ctx.launch().view_model_scope("upload");
    let client = ctx.client();
    let request_path = path.to_string();
    let (slot, callback) = capture::<JsonResponse>(path);

    let handle = scope.launch_vm(
        move || async move {
            let parts = build_parts(&field, &files, text)?;
            client.upload::<JsonResponse>(&request_path, &parts).await
        },
        callback,
    );

    let response = finish(scope.scope(), handle, &slot).await?;
    print_data(response.data.as_ref());
    Ok(())
}

/// Text parts first, then one part per file, all files under `field`.
pub fn build_parts(
    field: &str,
    files: &[PathBuf],
    text: Vec<(String, String)>,
) -> RequestResult<Vec<UploadPart>> {
    let mut parts: Vec<UploadPart> = text
        .into_iter()
        .map(|(name, value)| UploadPart::text(name, value))
        .collect();
    parts.extend(UploadPart::files(files.iter().map(|f| (field, f.as_path())))?);
    Ok(parts)
}
