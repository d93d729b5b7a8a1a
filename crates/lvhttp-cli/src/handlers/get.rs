//! `get` command handler.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{JsonResponse, capture, finish};
use crate::presentation::print_data;

/// GET `path` on a lifecycle scope and print the envelope's data.
pub async fn execute(ctx: &CliContext, path: &str) -> Result<(), CliError> {
    let scope = ctx.launch().lifecycle_scope("get");
    let client = ctx.client();
    let request_path = path.to_string();
    let (slot, callback) = capture::<JsonResponse>(path);

    let handle = scope.launch_af(
        move || async move { client.get::<JsonResponse>(&request_path).await },
        callback,
    );

    let response = finish(scope.scope(), handle, &slot).await?;
    print_data(response.data.as_ref());
    Ok(())
}
