//! JSON-lines request loop over stdio.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use mindmeld_config::Config;
use mindmeld_protocols::MessageHandler;
use mindmeld_runtime::dispatch_json;

use crate::app::{read_page, write_output, App};

/// Serve requests against one page until stdin closes, then write the page.
pub(crate) async fn serve(config: &Config, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let app = App::new(config, read_page(input).await?, None)?;
    info!(page = %input.display(), "Serving requests on stdin");

    let stdin = BufReader::new(tokio::io::stdin());
    let handled = serve_lines(app.router.as_ref(), stdin, tokio::io::stdout()).await?;
    info!(handled, "Input closed");

    if let Some(path) = output {
        write_output(Some(path), &app.page_html().await).await?;
    }
    Ok(())
}

/// Answer every non-blank line of `input` with one JSON line on `output`.
async fn serve_lines<R, W>(handler: &dyn MessageHandler, input: R, mut output: W) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut handled = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = dispatch_json(handler, line).await;
        debug!(success = response.success, "Request answered");

        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        output.write_all(&encoded).await?;
        output.flush().await?;
        handled += 1;
    }
    Ok(handled)
}
