use std::path::Path;

use anyhow::{Context, Result};

use super::{builder_for, read_document};

/// Drives a scripted walkthrough of the document, optionally
/// simulating a user interruption partway through.
pub fn run(file: &Path, interrupt_at: Option<usize>, config: Option<&Path>) -> Result<()> {
    let (name, text) = read_document(file)?;
    let builder = builder_for(config, false)?;
    let script = builder
        .build(&name, &text)
        .with_context(|| format!("Failed to build teaching script for {}", name))?;

    if script.queue.is_empty() {
        println!("No teachable units found in {}", name);
        return Ok(());
    }

    let mut machine = script.start_session()?;
    println!(
        "Session {} started: {} units\n",
        machine.context().session_id.as_deref().unwrap_or("?"),
        script.queue.len()
    );

    loop {
        let index = machine.context().current_unit_index;
        let (role, unit) = &script.queue[index];
        machine.set_current_role(Some(role.to_string()));

        let preview: String = unit.text.chars().take(120).collect();
        println!(
            "[unit {}] {} ({}):\n  {}...",
            index,
            unit.title.as_deref().unwrap_or("(untitled)"),
            role,
            preview
        );

        machine.start_bot_response();
        machine.finish_bot_response();

        if interrupt_at == Some(index) {
            let ack = machine.user_clicks_interrupt()?;
            println!("\n  -- interrupted at unit {} --", ack.interrupted_at_unit);

            let turn = machine.process_interruption_message("Can you clarify that?")?;
            println!("  user: {}", turn.user_message);

            machine.start_bot_response();
            machine.finish_bot_response();
            println!("  bot: (answers the question)");

            let resumed_from = machine.resume_conversation()?;
            println!("  -- resumed at unit {} --\n", resumed_from);
        }

        let outcome = machine.advance_unit()?;
        if outcome.completed {
            break;
        }
    }

    let summary = machine.get_state_summary();
    println!(
        "\nWalkthrough complete: {} messages, {} interruption(s)",
        summary.messages, summary.interruptions
    );

    Ok(())
}
