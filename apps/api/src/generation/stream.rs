//! Pull loop over a `FragmentStream`.
//!
//! Fragments are appended in arrival order and handed to `on_fragment` for partial
//! display. The cancellation token is checked before every pull; once it fires the
//! stream is dropped and whatever arrived so far is returned as `Cancelled`.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::llm_client::{FragmentStream, LlmError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Accumulated {
    Complete(String),
    Cancelled(String),
}

impl Accumulated {
    pub fn text(&self) -> &str {
        match self {
            Accumulated::Complete(text) | Accumulated::Cancelled(text) => text,
        }
    }
}

pub async fn accumulate<F>(
    mut stream: FragmentStream,
    cancel: &CancellationToken,
    mut on_fragment: F,
) -> Result<Accumulated, LlmError>
where
    F: FnMut(&str),
{
    let mut buffer = String::new();

    loop {
        if cancel.is_cancelled() {
            return Ok(Accumulated::Cancelled(buffer));
        }
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(Accumulated::Cancelled(buffer)),
            next = stream.next() => next,
        };
        match next {
            Some(Ok(fragment)) => {
                buffer.push_str(&fragment);
                on_fragment(&fragment);
            }
            Some(Err(e)) => return Err(e),
            None => return Ok(Accumulated::Complete(buffer)),
        }
    }
}
