use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::{error, info, warn};

use crate::agent::Agent;
use crate::model_gateway::ModelGateway;

pub const GREETING: &str = "안녕하세요, 저는 담당 의사입니다. 먼저 증상과 성별, 나이를 알려주시겠어요? (예: '저는 두통이 있어요. 여성, 30대')";
const PROMPT: &str = "사용자: ";
const REPLY_PREFIX: &str = "의사의 응답:";
const FAREWELL: &str = "대화를 종료합니다.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplExit {
    TurnLimitReached,
    InputClosed,
}

pub async fn run_repl<G, R, W>(
    agent: &mut Agent<'_, G>,
    input: &mut R,
    output: &mut W,
) -> Result<ReplExit>
where
    G: ModelGateway,
    R: BufRead,
    W: Write,
{
    if agent.turns() == 0 {
        writeln!(output, "{GREETING}").context("Failed to write greeting")?;
    }

    while !agent.is_done() {
        write!(output, "{PROMPT}").context("Failed to write prompt")?;
        output.flush().context("Failed to flush stdout")?;

        let mut raw = Vec::new();
        match input.read_until(b'\n', &mut raw) {
            Ok(0) => {
                info!(turns = agent.turns(), "input closed, ending conversation");
                return Ok(ReplExit::InputClosed);
            }
            Ok(_) => {}
            Err(err) => {
                warn!(error = %err, turn = agent.turns(), "failed to read user input");
                continue;
            }
        }
        let line = String::from_utf8_lossy(&raw);

        match agent.send_turn(strip_line_terminator(&line)).await {
            Ok(pending) => {
                writeln!(output, "{REPLY_PREFIX} {}", pending.reply().content)
                    .context("Failed to write reply")?;
                agent.complete_turn(pending);
            }
            Err(err) => {
                error!(error = %err, turn = agent.turns(), "chat request failed");
            }
        }
    }

    info!(
        turns = agent.turns(),
        max_turns = agent.max_turns(),
        "turn limit reached"
    );
    writeln!(output, "{FAREWELL}").context("Failed to write farewell")?;
    Ok(ReplExit::TurnLimitReached)
}

fn strip_line_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}
