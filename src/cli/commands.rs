use std::io::{self, Write};
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::task::{JoinHandle, JoinSet};

use super::terminal::{question_notice, spawn_renderer, video_notice};
use super::{ChatInput, Cli, Commands};
use crate::config::AppConfig;
use crate::domain::models::IngestionState;
use crate::infrastructure::api::BackendClient;
use crate::shared::errors::Result;
use crate::shared::state::{SessionController, VideoOutcome};

pub async fn run_cli(cli: Cli, mut config: AppConfig) -> Result<()> {
    cli.apply_overrides(&mut config);
    config.session.validate()?;

    let client = Arc::new(BackendClient::new(&config.api)?);
    tracing::info!(base_url = client.base_url(), "Using transcript backend");

    match cli.command {
        Commands::Chat { video } => {
            let controller = SessionController::with_backend(client.clone(), config.session);
            let lines = BufReader::new(tokio::io::stdin()).lines();
            run_chat(controller, Some(client.as_ref()), video, lines, io::stdout()).await
        }
        Commands::Status => run_status(&client).await,
        Commands::Ask { video, questions } => {
            let controller = SessionController::with_backend(client, config.session);
            run_ask(controller, &video, &questions).await
        }
    }
}

fn prompt(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "{text}")?;
    stdout.flush()
}

/// Interactive loop over `lines`; the session is rendered to `out`.
///
/// Questions run on their own tasks so input keeps flowing while an answer streams.
/// On `/quit` or end of input every submitted question is run to completion and the
/// final state is rendered before returning. `client` receives the backend `clear`
/// on `/new` when present.
pub async fn run_chat<R, W>(
    controller: SessionController,
    client: Option<&BackendClient>,
    video: Option<String>,
    mut lines: Lines<R>,
    out: W,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send + 'static,
{
    let renderer = spawn_renderer(controller.subscribe(), out);
    let mut questions = JoinSet::new();
    let mut pending_video = video;

    loop {
        if controller.view().ingestion_state != IngestionState::Ready {
            let reference = match pending_video.take() {
                Some(reference) => reference,
                None => {
                    prompt("YouTube URL (/quit to exit): ")?;
                    match lines.next_line().await? {
                        Some(line) => line,
                        None => break,
                    }
                }
            };
            if ChatInput::parse(&reference) == ChatInput::Quit {
                break;
            }
            println!("Loading transcript...");
            let outcome = controller.submit_video(&reference).await;
            if let Some(notice) = video_notice(&outcome) {
                println!("{notice}");
            }
            continue;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };
        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::New => {
                controller.reupload();
                if let Some(client) = client {
                    if let Err(e) = client.clear_transcript().await {
                        tracing::warn!(error = %e, "Failed to clear backend transcript");
                    }
                }
            }
            ChatInput::Dismiss => controller.dismiss_limit_modal(),
            ChatInput::Status => {
                let view = controller.view();
                println!(
                    "Questions used: {}/{} ({} left)",
                    view.question_count, view.quota_limit, view.remaining_questions
                );
            }
            ChatInput::Question(question) => {
                if question.is_empty() {
                    continue;
                }
                let controller = controller.clone();
                questions.spawn(async move {
                    let outcome = controller.submit_question(&question).await;
                    if let Some(notice) = question_notice(&outcome) {
                        println!("{notice}");
                    }
                });
            }
        }
    }

    while let Some(joined) = questions.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(error = %e, "Question task failed");
        }
    }
    finish_rendering(controller, renderer).await
}

/// Release the last sender and wait for the renderer to drain the final state
async fn finish_rendering(
    controller: SessionController,
    renderer: JoinHandle<io::Result<()>>,
) -> Result<()> {
    drop(controller);
    match renderer.await {
        Ok(result) => result?,
        Err(e) => tracing::warn!(error = %e, "Renderer task failed"),
    }
    Ok(())
}

async fn run_status(client: &BackendClient) -> Result<()> {
    let health = client.health().await?;
    println!("Backend {}: {} {}", client.base_url(), health.status, health.message);

    let current = client.current_transcript().await?;
    match current.video_url {
        Some(url) if current.loaded => println!("Loaded transcript: {url}"),
        _ => println!("No transcript loaded"),
    }
    Ok(())
}

async fn run_ask(controller: SessionController, video: &str, questions: &[String]) -> Result<()> {
    let renderer = spawn_renderer(controller.subscribe(), io::stdout());

    let outcome = controller.submit_video(video).await;
    if let Some(notice) = video_notice(&outcome) {
        println!("{notice}");
    }
    if matches!(outcome, VideoOutcome::Ready { .. }) {
        for question in questions {
            let outcome = controller.submit_question(question).await;
            if let Some(notice) = question_notice(&outcome) {
                println!("{notice}");
            }
        }
    }

    finish_rendering(controller, renderer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionSettings;
    use crate::domain::services::test_support::ScriptedGateway;
    use std::sync::Mutex;

    /// Writer whose bytes stay readable after the renderer task is done with it
    #[derive(Clone, Default)]
    struct SharedOutput(Arc<Mutex<Vec<u8>>>);

    impl SharedOutput {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedOutput {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn scripted_lines(input: &'static str) -> Lines<BufReader<&'static [u8]>> {
        BufReader::new(input.as_bytes()).lines()
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_finishes_answer_after_end_of_input() {
        let gateway = Arc::new(ScriptedGateway::new().with_answer("It covers ownership and borrowing."));
        let controller = SessionController::with_backend(gateway.clone(), SessionSettings::default());
        let out = SharedOutput::default();

        run_chat(
            controller,
            None,
            Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            scripted_lines("what is it?\n"),
            out.clone(),
        )
        .await
        .unwrap();

        let text = out.text();
        assert!(text.contains("You: what is it?\n"));
        assert!(text.ends_with("Assistant: It covers ownership and borrowing.\n"));
        assert_eq!(gateway.questions(), vec!["what is it?".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_quit_waits_for_pending_answer() {
        let gateway = Arc::new(ScriptedGateway::new().with_answer("done"));
        let controller = SessionController::with_backend(gateway, SessionSettings::default());
        let out = SharedOutput::default();

        run_chat(
            controller,
            None,
            Some("https://youtu.be/dQw4w9WgXcQ".to_string()),
            scripted_lines("first\n/quit\nnever asked\n"),
            out.clone(),
        )
        .await
        .unwrap();

        let text = out.text();
        assert!(text.ends_with("Assistant: done\n"));
        assert!(!text.contains("never asked"));
    }
}
