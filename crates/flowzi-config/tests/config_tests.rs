use flowzi_config::{Config, ConfigError, ConfigManager};
use flowzi_domain::{CurrencyRate, DASHBOARD_PROFILE, GOALS_PROFILE};
use tempfile::tempdir;

#[test]
fn default_config_carries_builtin_tables() {
    let cfg = Config::default();

    assert_eq!(cfg.currencies.rate("EUR"), 0.92);
    assert!(cfg.profile(DASHBOARD_PROFILE).is_some());
    assert!(cfg.profile(GOALS_PROFILE).is_some());
    assert_eq!(cfg.reminders.offsets_days, vec![7, 3, 1]);
    assert_eq!(cfg.insights.delay_seconds, 60);
    assert_eq!(cfg.log_filter, "flowzi=info");
    assert!(!cfg.milestones.scope_by_user);
}

#[test]
fn sparse_file_fills_in_defaults() {
    let cfg: Config =
        serde_json::from_str(r#"{"milestones": {"scope_by_user": true}}"#).expect("decode");
    assert!(cfg.milestones.scope_by_user);
    assert_eq!(cfg.budget_profiles.len(), 2);
    assert!(cfg.notifications.weekly_summary);
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("flowzi.json"), dir.path().join("backups"));

    assert_eq!(manager.load().expect("missing file loads defaults"), Config::default());

    let mut cfg = Config::default();
    cfg.currencies.upsert(CurrencyRate::new("CHF", 0.88, "CHF"));
    cfg.insights.category_share = 25.0;
    manager.save(&cfg).expect("save config");

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded.currencies.rate("CHF"), 0.88);
    assert_eq!(loaded.insights.category_share, 25.0);
    assert!(!dir.path().join("flowzi.json.tmp").exists());
}

#[test]
fn backups_can_be_listed_and_restored() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).expect("manager");

    let mut cfg = Config::default();
    cfg.notifications.weekly_summary = false;
    let name = manager.backup(&cfg, Some("before reset")).expect("backup");
    assert!(name.starts_with("flowzi_before-reset_"));
    assert_eq!(manager.list_backups().expect("list"), vec![name.clone()]);

    manager.save(&Config::default()).expect("save default");
    let restored = manager.restore(&name).expect("restore");
    assert!(!restored.notifications.weekly_summary);
    assert!(!manager.load().expect("reload").notifications.weekly_summary);

    assert!(matches!(
        manager.restore("missing.json"),
        Err(ConfigError::BackupNotFound(_))
    ));
}
