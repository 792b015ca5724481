//! Line-based interactive loop shared by the multi-turn agents.

use anyhow::Context;
use log::{info, warn};
use mnemos::config::SessionConfig;
use mnemos::core::{AgentMode, ConversationAgent, SessionState, TurnReport};
use mnemos::memory::ANONYMOUS_IDENTITY;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Read one trimmed line, or `None` at end of input.
async fn read_line<R>(reader: &mut R) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .context("failed to read input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Ask for the identity whose long-term memory should be loaded.
pub async fn prompt_identity<R, W>(reader: &mut R, out: &mut W) -> anyhow::Result<String>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "What's your name? ")?;
    out.flush()?;
    let name = read_line(reader).await?.unwrap_or_default();
    if name.is_empty() {
        Ok(ANONYMOUS_IDENTITY.to_string())
    } else {
        Ok(name)
    }
}

/// Drive `agent` until the exit command or end of input, then finish the
/// session.
pub async fn run_session<R, W>(
    agent: &mut dyn ConversationAgent,
    session: &SessionConfig,
    reader: &mut R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(
        out,
        "Mnemos {} chat. Type '{}' to quit.",
        agent.mode(),
        session.exit_command
    )?;
    loop {
        write!(out, "\nYou: ")?;
        out.flush()?;
        let Some(input) = read_line(reader).await? else {
            break;
        };
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case(&session.exit_command) {
            break;
        }
        match agent.respond(&input).await {
            Ok(report) => {
                write_report(out, agent.mode(), &report, agent.session(), session.preview_chars)?
            }
            Err(err) => {
                warn!("turn failed (error={})", err);
                writeln!(out, "Error: {err}")?;
            }
        }
    }

    info!(
        "session ending (session_id={}, turns={})",
        agent.session().id,
        agent.session().turn_number
    );
    match agent.finish().await {
        Ok(Some(record)) if record.is_empty() => {
            writeln!(out, "Long-term memory saved (nothing to remember yet).")?
        }
        Ok(Some(record)) => writeln!(out, "Long-term memory saved:\n{}", record.render())?,
        Ok(None) => {}
        Err(err) => {
            warn!("failed to persist long-term memory (error={})", err);
            writeln!(out, "Error: failed to save long-term memory: {err}")?;
        }
    }
    writeln!(out, "Goodbye!")?;
    Ok(())
}

fn write_report<W: Write>(
    out: &mut W,
    mode: AgentMode,
    report: &TurnReport,
    state: &SessionState,
    preview_chars: usize,
) -> anyhow::Result<()> {
    writeln!(out, "\nAssistant: {}", report.reply)?;
    let timing = format!("turn {} | {:.2}s", report.turn, report.elapsed.as_secs_f64());
    let tokens = format!(
        "tokens in {} / out {}",
        report.usage.prompt_tokens, report.usage.completion_tokens
    );
    match mode {
        AgentMode::Stateless => writeln!(out, "  [{timing} | {tokens}]")?,
        AgentMode::Stateful => writeln!(
            out,
            "  [{timing} | history {} msgs | {tokens} | total in {}]",
            report.context_messages, state.input_tokens
        )?,
        AgentMode::Memory | AgentMode::LongTerm => {
            writeln!(
                out,
                "  [{timing} | window {} msgs | memory {} chars | {tokens}]",
                report.context_messages, report.digest_chars
            )?;
            if report.compressed
                && preview_chars > 0
                && let Some(digest) = state.digest.as_ref()
            {
                let preview: String = digest.render().chars().take(preview_chars).collect();
                writeln!(out, "  Memory updated:\n{preview}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{prompt_identity, run_session};
    use mnemos::config::SessionConfig;
    use mnemos::core::{AgentSettings, LongTermContext, MemoryAgent, StatefulAgent};
    use mnemos::memory::{FileLongTermStore, LongTermStore};
    use mnemos_test_utils::ScriptedLLM;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn loop_skips_blanks_and_stops_at_exit() {
        let llm = Arc::new(ScriptedLLM::with_replies(["Hello!"]));
        let mut agent = StatefulAgent::new(llm.clone(), AgentSettings::default());
        let mut input: &[u8] = b"hi\n\n   \nEXIT\nnever sent\n";
        let mut out = Vec::new();

        run_session(&mut agent, &SessionConfig::default(), &mut input, &mut out)
            .await
            .expect("session");

        let printed = String::from_utf8(out).expect("utf8");
        assert_eq!(llm.request_count(), 1);
        assert!(printed.contains("Assistant: Hello!"));
        assert!(printed.contains("history 2 msgs"));
        assert!(printed.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn collaborator_errors_do_not_end_the_session() {
        let llm = Arc::new(ScriptedLLM::new());
        llm.push_failure("rate limited");
        llm.push_reply("second try works");
        let mut agent = MemoryAgent::new(llm, AgentSettings::default());
        let mut input: &[u8] = b"first\nsecond\n";
        let mut out = Vec::new();

        run_session(&mut agent, &SessionConfig::default(), &mut input, &mut out)
            .await
            .expect("session");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.contains("Error: collaborator error"));
        assert!(printed.contains("Assistant: second try works"));
    }

    #[tokio::test]
    async fn exit_prints_saved_long_term_items() {
        let temp = tempdir().expect("tempdir");
        let store: Arc<dyn LongTermStore> =
            Arc::new(FileLongTermStore::new(temp.path().join("user_memories.json")));
        let llm = Arc::new(ScriptedLLM::with_replies([
            "Hi Ana.",
            r#"{"facts": ["Works as a nurse"], "preferences": ["Likes tea"]}"#,
        ]));
        let settings = AgentSettings::default();
        let context = LongTermContext::load(llm.clone(), &settings, store, "ana")
            .await
            .expect("context");
        let mut agent = MemoryAgent::new(llm, settings).with_long_term(context);
        let mut input: &[u8] = b"I'm Ana, a nurse who likes tea\nexit\n";
        let mut out = Vec::new();

        run_session(&mut agent, &SessionConfig::default(), &mut input, &mut out)
            .await
            .expect("session");

        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.contains(
            "Long-term memory saved:\nFacts about this user:\n- Works as a nurse"
        ));
        assert!(printed.contains("User preferences:\n- Likes tea"));
    }

    #[tokio::test]
    async fn blank_identity_is_anonymous() {
        let mut input: &[u8] = b"  \n";
        let mut out = Vec::new();
        let name = prompt_identity(&mut input, &mut out).await.expect("name");
        assert_eq!(name, "anonymous");
    }
}
