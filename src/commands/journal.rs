//! `agentlock journal`: print recent activity.

use crate::cli::JournalArgs;
use agentlock::context::LockContext;
use agentlock::error::Result;
use agentlock::journal::{ActivityEvent, Journal};
use std::collections::VecDeque;

pub fn cmd_journal(ctx: &LockContext, args: JournalArgs) -> Result<()> {
    let events = recent_events(&Journal::new(ctx.journal_path()), &args)?;

    if events.is_empty() {
        println!("No activity recorded.");
        return Ok(());
    }

    for event in &events {
        println!(
            "{}  {:<13}  {:<24}  {}",
            event.ts.format("%Y-%m-%d %H:%M:%S"),
            event.action.to_string(),
            event.agent_id,
            event.resource.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}

/// The last `args.limit` events, oldest first, optionally for one agent.
fn recent_events(journal: &Journal, args: &JournalArgs) -> Result<Vec<ActivityEvent>> {
    if args.limit == 0 {
        return Ok(Vec::new());
    }
    let mut tail = VecDeque::new();

    for event in journal.events()? {
        if args.agent.as_ref().is_some_and(|agent| &event.agent_id != agent) {
            continue;
        }
        if tail.len() == args.limit {
            tail.pop_front();
        }
        tail.push_back(event);
    }

    Ok(tail.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlock::journal::ActivityAction;
    use tempfile::TempDir;

    fn args(limit: usize, agent: Option<&str>) -> JournalArgs {
        JournalArgs {
            limit,
            agent: agent.map(str::to_string),
        }
    }

    #[test]
    fn keeps_last_n_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("activity.ndjson"));
        for i in 0..5 {
            journal
                .append(
                    &ActivityEvent::new(ActivityAction::Operation, "a1")
                        .with_resource(format!("/r/{}.rs", i)),
                )
                .unwrap();
        }

        let events = recent_events(&journal, &args(2, None)).unwrap();

        let resources: Vec<_> = events.iter().filter_map(|e| e.resource.clone()).collect();
        assert_eq!(resources, vec!["/r/3.rs", "/r/4.rs"]);
    }

    #[test]
    fn huge_limit_returns_everything() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("activity.ndjson"));
        for _ in 0..3 {
            journal
                .append(&ActivityEvent::new(ActivityAction::LockCreated, "a1"))
                .unwrap();
        }

        let events = recent_events(&journal, &args(usize::MAX, None)).unwrap();

        assert_eq!(events.len(), 3);
    }

    #[test]
    fn filters_by_agent() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("activity.ndjson"));
        journal
            .append(&ActivityEvent::new(ActivityAction::LockCreated, "a1"))
            .unwrap();
        journal
            .append(&ActivityEvent::new(ActivityAction::LockCreated, "a2"))
            .unwrap();

        let events = recent_events(&journal, &args(10, Some("a2"))).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].agent_id, "a2");
    }

    #[test]
    fn missing_journal_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path().join("absent.ndjson"));

        assert!(recent_events(&journal, &args(10, None)).unwrap().is_empty());
    }
}
