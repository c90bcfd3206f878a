use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::client::{AnswerClient, AskError};
use crate::types::ChatId;

/// Shown when the service succeeds without an answer.
pub const FALLBACK_ANSWER: &str = "Sorry, I could not process your question.";

/// Shown when the user left the chat before its answer arrived.
pub const CANCELLED_REPLY: &str = "Request cancelled before an answer arrived.";

/// A question that has been appended to a chat and still needs an answer.
#[derive(Debug)]
pub struct Submission {
    pub chat_id: ChatId,
    pub question: String,
    cancel: CancellationToken,
}

impl Submission {
    pub fn new(chat_id: ChatId, question: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            chat_id,
            question: question.into(),
            cancel,
        }
    }

    /// Asks the service, giving up as soon as the submission is cancelled.
    pub async fn run(self, client: &AnswerClient) -> Reply {
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                tracing::info!(chat_id = %self.chat_id, "submission cancelled");
                Err(AskError::Cancelled)
            }
            result = client.ask(&self.question) => result,
        };
        Reply {
            chat_id: self.chat_id,
            outcome,
        }
    }

    /// Runs the submission and posts its reply to the event loop.
    ///
    /// Returns `false` when the loop has already shut down; the reply is then
    /// dropped and only logged.
    pub async fn deliver(self, client: &AnswerClient, replies: &mpsc::Sender<Reply>) -> bool {
        let reply = self.run(client).await;
        let chat_id = reply.chat_id;
        match replies.send(reply).await {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(%chat_id, "reply dropped, nobody is listening");
                false
            }
        }
    }
}

/// Result of one submission, addressed to the chat it was asked in.
#[derive(Debug)]
pub struct Reply {
    pub chat_id: ChatId,
    pub outcome: Result<Option<String>, AskError>,
}

impl Reply {
    /// Text of the assistant message this reply turns into.
    pub fn content(&self) -> String {
        match &self.outcome {
            Ok(Some(answer)) => answer.clone(),
            Ok(None) => FALLBACK_ANSWER.to_string(),
            Err(AskError::Cancelled) => CANCELLED_REPLY.to_string(),
            Err(err) => format!("Technical error: {err}. Check the log for more details."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(outcome: Result<Option<String>, AskError>) -> Reply {
        Reply {
            chat_id: ChatId::new_v4(),
            outcome,
        }
    }

    #[test]
    fn answer_is_used_verbatim() {
        assert_eq!(
            reply(Ok(Some("A pain reliever.".to_string()))).content(),
            "A pain reliever."
        );
    }

    #[test]
    fn missing_answer_falls_back() {
        assert_eq!(reply(Ok(None)).content(), FALLBACK_ANSWER);
    }

    #[test]
    fn errors_embed_their_description() {
        let content = reply(Err(AskError::MalformedResponse {
            body: "<html>oops</html>".to_string(),
        }))
        .content();
        assert!(content.starts_with("Technical error: "));
        assert!(content.contains("<html>oops</html>"));

        assert_eq!(reply(Err(AskError::Cancelled)).content(), CANCELLED_REPLY);
    }

    #[tokio::test]
    async fn cancelled_submission_skips_the_request() {
        // Nothing listens on this port; a request would fail as transport error.
        let client = AnswerClient::new("http://127.0.0.1:9", None).expect("client builds");
        let token = CancellationToken::new();
        token.cancel();
        let chat_id = ChatId::new_v4();

        let reply = Submission::new(chat_id, "still there?", token)
            .run(&client)
            .await;

        assert_eq!(reply.chat_id, chat_id);
        assert!(matches!(reply.outcome, Err(AskError::Cancelled)));
    }

    #[tokio::test]
    async fn reply_reaches_a_listening_loop() {
        let client = AnswerClient::new("http://127.0.0.1:9", None).expect("client builds");
        let token = CancellationToken::new();
        token.cancel();
        let chat_id = ChatId::new_v4();
        let (tx, mut rx) = mpsc::channel(1);

        assert!(Submission::new(chat_id, "hi", token).deliver(&client, &tx).await);
        let reply = rx.recv().await.expect("reply posted");
        assert_eq!(reply.chat_id, chat_id);
    }

    #[tokio::test]
    async fn reply_after_shutdown_is_dropped() {
        let client = AnswerClient::new("http://127.0.0.1:9", None).expect("client builds");
        let token = CancellationToken::new();
        token.cancel();
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let delivered = Submission::new(ChatId::new_v4(), "hi", token)
            .deliver(&client, &tx)
            .await;

        assert!(!delivered);
    }
}
