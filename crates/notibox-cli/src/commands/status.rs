use notibox_core::format_badge_count;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;

    let unread = store.notifications().iter().filter(|n| n.unread).count();
    let last_fetched = store
        .last_fetched()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "never".to_string());

    if json {
        let badge = store.badge();
        let status = serde_json::json!({
            "active": store.notifications().len(),
            "unread": unread,
            "snoozed": store.snoozed().len(),
            "archived": store.archived().len(),
            "rules": store.rules().len(),
            "filter": store.active_filter().as_str(),
            "version": store.version(),
            "last_fetched": last_fetched,
            "badge": {
                "count": badge.count,
                "priority": badge.priority,
                "text": format_badge_count(badge.count),
            },
            "remote_error": store.remote_error(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("Active:   {} ({} unread)", store.notifications().len(), unread);
        println!("Snoozed:  {}", store.snoozed().len());
        println!("Archived: {}", store.archived().len());
        println!("Rules:    {}", store.rules().len());
        println!("Filter:   {}", store.active_filter().as_str());
        println!("Version:  {}", store.version());
        println!("Fetched:  {last_fetched}");
        if let Some(err) = store.remote_error() {
            println!("warning: last remote sync failed: {err}");
        }
    }

    Ok(())
}

/// Print the badge text for status bars: empty when all read,
/// otherwise the count capped at "99+".
pub fn badge(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;
    let badge = store.badge();
    let text = format_badge_count(badge.count);

    if json {
        let out = serde_json::json!({
            "count": badge.count,
            "priority": badge.priority,
            "text": text,
        });
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("{text}");
    }

    Ok(())
}
