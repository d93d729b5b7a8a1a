//! `post` command handler.
//!
//! Awaits the classified state directly instead of going through a
//! scope callback; the registered handlers still report failures.

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::JsonResponse;
use crate::presentation::print_data;

/// POST `fields` as a form to `path` and print the envelope's data.
pub async fn execute(
    ctx: &CliContext,
    path: &str,
    fields: Vec<(String, String)>,
) -> Result<(), CliError> {
    let client = ctx.client();
    let request_path = path.to_string();

    let state = ctx
        .launch()
        .launch_http(move || async move {
            client
                .post_form::<JsonResponse>(&request_path, &fields)
                .await
        })
        .await;

    let response = state.into_result()?;
    print_data(response.data.as_ref());
    Ok(())
}
