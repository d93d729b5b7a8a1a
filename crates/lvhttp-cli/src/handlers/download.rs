//! `download` command handler.

use std::path::{Path, PathBuf};

use lvhttp_client::DownloadTarget;
use url::Url;

use crate::bootstrap::CliContext;
use crate::error::CliError;
use crate::handlers::{capture, finish};
use crate::presentation::ConsoleProgress;

/// Stream `url` into `dir`, printing progress, on a lifecycle scope.
///
/// The file name defaults to the last segment of the resolved URL path.
pub async fn execute(
    ctx: &CliContext,
    url: &str,
    dir: &Path,
    name: Option<String>,
) -> Result<PathBuf, CliError> {
    let client = ctx.client();
    let resolved = client
        .url(url)
        .map_err(|e| CliError::Arguments(e.to_string()))?;
    let file_name = match name {
        Some(name) => name,
        None => file_name_from_url(&resolved).ok_or_else(|| {
            CliError::Arguments(format!("cannot infer a file name from '{url}', pass --name"))
        })?,
    };
    let target = DownloadTarget::new(dir, file_name);

    let scope = ctx.launch().lifecycle_scope("download");
    let (slot, callback) = capture::<PathBuf>(url);

    let handle = scope.launch_af_http(
        move || async move {
            let progress = ConsoleProgress::stderr();
            client.download(resolved.as_str(), &target, &progress).await
        },
        Some(callback),
    );

    finish(scope.scope(), handle, &slot).await
}

/// Last non-empty path segment, percent-decoded.
///
/// Dot segments are already normalized away by the URL parser. A segment
/// that decodes to something other than a plain file name yields `None`.
pub fn file_name_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.rev().find(|s| !s.is_empty())?;
    let name = urlencoding::decode(segment).ok()?;
    let plain = !name.contains(['/', '\\']) && name != "." && name != "..";
    plain.then(|| name.into_owned())
}
