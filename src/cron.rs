use anyhow::Result;
use chrono::Timelike;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::CronConfig;
use crate::scheduler::{DayType, Schedule, ScheduleEntry};
use crate::theme::Bucket;

pub const CRONTAB_FILE: &str = "cron-setup.txt";

pub fn script_name(bucket: Bucket) -> String {
    format!("run-{}-blog.sh", bucket.name())
}

pub fn script_body(bucket: Bucket, cron: &CronConfig, site_name: &str) -> String {
    format!(
        "#!/bin/bash\n\
         # {site} {bucket} blog post generator\n\
         cd {dir}\n\
         {command} --immediate {bucket}\n\
         echo \"$(date): {bucket} blog post generation completed\" >> cron.log\n",
        site = site_name,
        bucket = bucket.name(),
        dir = shell_quote(&cron.project_dir),
        command = cron.command,
    )
}

// Single-quotes `text` for sh unless it is made only of safe characters.
fn shell_quote(text: &str) -> String {
    let safe = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '_' | '-' | '+' | ',' | ':' | '=' | '@' | '%'));
    if safe {
        text.to_string()
    } else {
        format!("'{}'", text.replace('\'', "'\\''"))
    }
}

/// Crontab lines for the whole schedule. Weekday slots run `1-5`, weekend
/// slots `6,0` since both weekend days share one slot list.
pub fn crontab(schedule: &Schedule, cron: &CronConfig, site_name: &str) -> String {
    let script_dir = cron.script_dir.trim_end_matches('/');
    let line = |entry: &ScheduleEntry, days: &str| {
        format!(
            "{} {} * * {} {}\n",
            entry.time.minute(),
            entry.time.hour(),
            days,
            shell_quote(&format!("{}/{}", script_dir, script_name(entry.bucket)))
        )
    };

    let mut out = String::new();
    let _ = writeln!(out, "# {} Tennis Blog Generator - Complete Cron Setup", site_name);
    let _ = writeln!(out, "# =====================================================");

    out.push_str("\n# Weekdays\n");
    for entry in schedule.entries_for(DayType::Weekday) {
        out.push_str(&line(entry, "1-5"));
    }

    out.push_str("\n# Weekends\n");
    for entry in schedule.entries_for(DayType::Saturday) {
        out.push_str(&line(entry, "6,0"));
    }

    out
}

/// Writes one runner script per bucket plus the crontab file into `cron.script_dir`.
pub fn write_setup(schedule: &Schedule, cron: &CronConfig, site_name: &str) -> Result<Vec<PathBuf>> {
    let dir = Path::new(&cron.script_dir);
    fs::create_dir_all(dir)?;

    let mut written = Vec::new();
    for bucket in Bucket::ALL {
        let path = dir.join(script_name(bucket));
        fs::write(&path, script_body(bucket, cron, site_name))?;
        make_executable(&path)?;
        info!(path = %path.display(), "Created cron script");
        written.push(path);
    }

    let path = dir.join(CRONTAB_FILE);
    fs::write(&path, crontab(schedule, cron, site_name))?;
    info!(path = %path.display(), "Created cron configuration");
    written.push(path);

    Ok(written)
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;

    fn cron_config(dir: &Path) -> CronConfig {
        CronConfig {
            project_dir: "/srv/aceplan".into(),
            command: "racket_blog".into(),
            script_dir: dir.to_string_lossy().into_owned(),
        }
    }

    #[test]
    fn default_schedule_crontab() {
        let schedule = Schedule::from_config(&ScheduleConfig::default()).unwrap();
        let cron = CronConfig {
            script_dir: "/srv/aceplan/".into(),
            ..CronConfig::default()
        };

        let lines: Vec<_> = crontab(&schedule, &cron, "AcePlan")
            .lines()
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(str::to_string)
            .collect();

        assert_eq!(
            lines,
            vec![
                "0 9 * * 1-5 /srv/aceplan/run-morning-blog.sh",
                "0 17 * * 1-5 /srv/aceplan/run-evening-blog.sh",
                "0 9 * * 6,0 /srv/aceplan/run-morning-blog.sh",
                "0 12 * * 6,0 /srv/aceplan/run-afternoon-blog.sh",
                "0 15 * * 6,0 /srv/aceplan/run-afternoon-blog.sh",
                "0 19 * * 6,0 /srv/aceplan/run-evening-blog.sh",
            ]
        );
    }

    #[test]
    fn script_runs_immediate_slot() {
        let body = script_body(Bucket::Evening, &cron_config(Path::new("/tmp")), "AcePlan");
        assert!(body.starts_with("#!/bin/bash\n"));
        assert!(body.contains("cd /srv/aceplan\n"));
        assert!(body.contains("racket_blog --immediate evening\n"));
        assert!(body.contains(">> cron.log"));
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        let schedule = Schedule::from_config(&ScheduleConfig::default()).unwrap();
        let cron = CronConfig {
            project_dir: "/home/coach/Tennis Blog".into(),
            command: "racket_blog".into(),
            script_dir: "/home/coach/Tennis Blog/cron".into(),
        };

        let body = script_body(Bucket::Morning, &cron, "AcePlan");
        assert!(body.contains("cd '/home/coach/Tennis Blog'\n"));

        let table = crontab(&schedule, &cron, "AcePlan");
        assert!(table.contains("0 9 * * 1-5 '/home/coach/Tennis Blog/cron/run-morning-blog.sh'\n"));
        assert!(table.contains("0 19 * * 6,0 '/home/coach/Tennis Blog/cron/run-evening-blog.sh'\n"));
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote("/srv/aceplan"), "/srv/aceplan");
        assert_eq!(shell_quote("/srv/coach's blog"), "'/srv/coach'\\''s blog'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn every_weekend_slot_runs_both_days() {
        let schedule = Schedule::from_config(&ScheduleConfig {
            weekday: vec![],
            weekend: vec!["08:30".into(), "20:00".into()],
            ..ScheduleConfig::default()
        })
        .unwrap();

        let table = crontab(&schedule, &cron_config(Path::new("/srv")), "AcePlan");
        let weekend: Vec<_> = table.lines().skip_while(|l| *l != "# Weekends").skip(1).collect();
        assert_eq!(
            weekend,
            vec!["30 8 * * 6,0 /srv/run-morning-blog.sh", "0 20 * * 6,0 /srv/run-evening-blog.sh"]
        );
    }

    #[test]
    fn write_setup_creates_scripts_and_crontab() {
        let dir = tempfile::tempdir().unwrap();
        let schedule = Schedule::from_config(&ScheduleConfig::default()).unwrap();

        let written = write_setup(&schedule, &cron_config(dir.path()), "AcePlan").unwrap();

        assert_eq!(written.len(), 4);
        for name in ["run-morning-blog.sh", "run-afternoon-blog.sh", "run-evening-blog.sh", CRONTAB_FILE] {
            assert!(dir.path().join(name).exists(), "{} missing", name);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.path().join("run-morning-blog.sh")).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
