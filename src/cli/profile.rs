//! Player profile commands

use anyhow::Result;

use expgacha::present::format_thousands;
use expgacha::sync::NameChange;
use expgacha::GameContext;

/// Change the display name
pub async fn rename_command(ctx: &GameContext, name: &str) -> Result<()> {
    match ctx.orchestrator().change_username(name).await? {
        NameChange::Synced => println!("Renamed to {} (leaderboard updated).", name),
        NameChange::LocalOnly => println!("Renamed to {}.", name),
        NameChange::RemoteFailed => println!(
            "Renamed to {} locally; the leaderboard could not be updated.",
            name
        ),
    }
    Ok(())
}

/// List achievements in evaluation order
pub fn achievements_command(ctx: &GameContext) -> Result<()> {
    let achievements = ctx.orchestrator().achievements();
    let unlocked = achievements.iter().filter(|a| a.is_unlocked).count();
    println!("Achievements ({}/{}):\n", unlocked, achievements.len());

    for achievement in &achievements {
        let range = if achievement.max_score == i64::MAX {
            format!("{}+", achievement.min_score)
        } else if achievement.min_score == achievement.max_score {
            achievement.min_score.to_string()
        } else {
            format!("{}-{}", achievement.min_score, achievement.max_score)
        };
        let mark = if achievement.is_unlocked { "[x]" } else { "[ ]" };
        println!("  {} {:<22} {}", mark, achievement.display_name, range);
        if achievement.is_unlocked {
            println!("      {}", achievement.comment);
        }
    }
    Ok(())
}

/// Show identity and local record
pub fn whoami_command(ctx: &GameContext) -> Result<()> {
    let orchestrator = ctx.orchestrator();
    let identity = orchestrator.identity();
    let record = orchestrator.best_record();

    println!("Name:     {}", identity.username);
    println!("Token:    {}", identity.client_token);
    println!("Best:     {}", record.best_score);
    println!("Attempts: {}", format_thousands(record.attempt_count));
    Ok(())
}

/// Print a share post for the best score
pub async fn share_command(ctx: &GameContext) -> Result<()> {
    match ctx.share_best().await {
        Some(text) => print!("{}", text),
        None => println!("No score yet. Play a round first!"),
    }
    Ok(())
}
