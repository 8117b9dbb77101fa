//! `agentlock lock ...`: listing and administering leases.

use super::resource_path;
use crate::cli::{LockClearArgs, ReleaseAgentArgs};
use agentlock::context::LockContext;
use agentlock::error::{AgentLockError, Result};
use agentlock::identity::{IdentitySource, resolve_agent_id};
use agentlock::locks::LockCoordinator;
use std::path::Path;

pub fn cmd_lock_list(ctx: &LockContext) -> Result<()> {
    let coordinator = LockCoordinator::from_context(ctx);
    let locks = coordinator.list_locks()?;

    if locks.is_empty() {
        println!("No active locks.");
        return Ok(());
    }

    println!("Locks ({}):", locks.len());
    println!();

    for lock in &locks {
        println!("  {}:", lock.record.resource_path);
        println!("    Owner:      {}", lock.record.owner_agent_id);
        if let Some(pid) = lock.record.pid {
            println!("    PID:        {}", pid);
        }
        if let Some(host) = &lock.record.host {
            println!("    Host:       {}", host);
        }
        println!(
            "    Acquired:   {}",
            lock.record.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        println!("    Age:        {}", lock.age);
        println!("    Operation:  {}", lock.record.operation);
        if lock.is_live {
            println!("    Expires in: {} min", lock.remaining_minutes);
        } else {
            println!("    Status:     EXPIRED");
        }
        println!("    Key:        {}", lock.record.resource_key);
        println!();
    }

    let expired_count = locks.iter().filter(|l| !l.is_live).count();
    if expired_count > 0 {
        println!(
            "Note: {} lease(s) have expired. Use `agentlock lock cleanup` to remove them.",
            expired_count
        );
    }

    Ok(())
}

pub fn cmd_lock_cleanup(ctx: &LockContext) -> Result<()> {
    let removed = LockCoordinator::from_context(ctx).cleanup_expired()?;
    println!("Removed {} expired lease(s).", removed);
    Ok(())
}

pub fn cmd_lock_clear(ctx: &LockContext, cwd: &Path, args: LockClearArgs) -> Result<()> {
    if !args.force {
        return Err(AgentLockError::UserError(format!(
            "refusing to clear lease without --force flag.\n\n\
             Clearing a lease another agent still relies on lets two agents edit the same file.\n\
             Only clear leases whose holder you know has stopped.\n\n\
             To clear the lease, run:\n  agentlock lock clear {} --force",
            args.path
        )));
    }

    let path = resource_path(&args.path, cwd);
    let actor = resolve_agent_id(&IdentitySource::from_env(None));
    let coordinator = LockCoordinator::from_context(ctx);

    let Some(cleared) = coordinator.force_release(&path, &actor)? else {
        println!("No lease held on {}", path);
        return Ok(());
    };

    println!("Cleared lease: {}", cleared.resource_path);
    println!();
    println!("Lease details:");
    println!("  Owner:      {}", cleared.owner_agent_id);
    if let Some(pid) = cleared.pid {
        println!("  PID:        {}", pid);
    }
    println!(
        "  Acquired:   {}",
        cleared.acquired_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!("  Operation:  {}", cleared.operation);
    println!("  Lock ID:    {}", cleared.lock_id);

    Ok(())
}

pub fn cmd_lock_release_agent(ctx: &LockContext, args: ReleaseAgentArgs) -> Result<()> {
    let removed = LockCoordinator::from_context(ctx).release_all_for(&args.agent)?;
    println!("Released {} lease(s) held by {}.", removed, args.agent);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentlock::config::Config;
    use agentlock::journal::ActivityAction;
    use agentlock::locks::AcquireRequest;
    use agentlock::store::ResourceKey;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn create_test_context() -> (TempDir, LockContext) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = LockContext::with_config(temp_dir.path().join(".agentlock"), Config::default());
        (temp_dir, ctx)
    }

    fn hold(ctx: &LockContext, path: &str, agent: &str) {
        let coordinator = LockCoordinator::from_context(ctx);
        assert!(
            coordinator
                .acquire(&AcquireRequest::new(path, agent, "editing"))
                .unwrap()
                .is_granted()
        );
    }

    #[test]
    fn clear_without_force_is_refused() {
        let (temp_dir, ctx) = create_test_context();
        let path = resource_path("a.rs", temp_dir.path());
        hold(&ctx, &path, "a1");

        let err = cmd_lock_clear(
            &ctx,
            temp_dir.path(),
            LockClearArgs {
                path: "a.rs".to_string(),
                force: false,
            },
        )
        .unwrap_err();

        assert!(matches!(err, AgentLockError::UserError(_)));
        assert!(err.to_string().contains("--force"));
        let key = ResourceKey::from_path(&path);
        assert!(
            LockCoordinator::from_context(&ctx)
                .store()
                .get(&key)
                .unwrap()
                .is_some()
        );
    }

    #[test]
    fn clear_with_force_removes_foreign_lease() {
        let (temp_dir, ctx) = create_test_context();
        let path = resource_path("a.rs", temp_dir.path());
        hold(&ctx, &path, "a1");

        cmd_lock_clear(
            &ctx,
            temp_dir.path(),
            LockClearArgs {
                path: "a.rs".to_string(),
                force: true,
            },
        )
        .unwrap();

        let coordinator = LockCoordinator::from_context(&ctx);
        assert!(coordinator.store().list().unwrap().is_empty());
        let released = coordinator
            .journal()
            .events()
            .unwrap()
            .filter(|e| e.action == ActivityAction::LockReleased)
            .count();
        assert_eq!(released, 1);
    }

    #[test]
    fn clear_of_unheld_path_succeeds() {
        let (temp_dir, ctx) = create_test_context();

        let result = cmd_lock_clear(
            &ctx,
            temp_dir.path(),
            LockClearArgs {
                path: "nothing.rs".to_string(),
                force: true,
            },
        );

        assert!(result.is_ok());
    }

    #[test]
    fn cleanup_and_release_agent() {
        let (_temp_dir, ctx) = create_test_context();
        let coordinator = LockCoordinator::from_context(&ctx);
        hold(&ctx, "/r/b.rs", "a2");
        hold(&ctx, "/r/c.rs", "a2");
        let past = Utc::now() - Duration::hours(1);
        coordinator
            .acquire_at(&AcquireRequest::new("/r/old.rs", "a1", "editing"), past)
            .unwrap();
        assert_eq!(coordinator.store().list().unwrap().len(), 3);

        cmd_lock_cleanup(&ctx).unwrap();
        assert_eq!(coordinator.store().list().unwrap().len(), 2);

        cmd_lock_release_agent(
            &ctx,
            ReleaseAgentArgs {
                agent: "a2".to_string(),
            },
        )
        .unwrap();
        assert!(coordinator.store().list().unwrap().is_empty());
    }

    #[test]
    fn list_handles_empty_and_populated_dirs() {
        let (_temp_dir, ctx) = create_test_context();
        cmd_lock_list(&ctx).unwrap();

        hold(&ctx, "/r/a.rs", "a1");
        cmd_lock_list(&ctx).unwrap();
    }
}
