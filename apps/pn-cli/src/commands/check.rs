// check.rs: Validate the notification config and list its endpoints.

use std::path::Path;

use pn_dispatch::NotifyConfig;

pub fn execute(path: &Path, config: &NotifyConfig) -> anyhow::Result<()> {
    if !path.exists() {
        println!("No notification config found at {}", path.display());
        return Ok(());
    }

    print!("{}", render_summary(config));

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("Config OK: {} job(s), {} endpoint(s).", config.jobs.len(), config.endpoint_count());
        return Ok(());
    }

    println!();
    for warning in &warnings {
        println!("warning: {}", warning);
    }
    anyhow::bail!("{} problem(s) found in {}", warnings.len(), path.display());
}

fn render_summary(config: &NotifyConfig) -> String {
    let mut out = format!("{:<20} {:<6} {:<5} {:>5}  URL\n", "JOB", "PROTO", "FMT", "LOG");
    out.push_str(&"-".repeat(72));
    out.push('\n');

    for job in &config.jobs {
        if job.endpoints.is_empty() {
            out.push_str(&format!("{:<20} (no endpoints)\n", job.name));
        }
        for endpoint in &job.endpoints {
            out.push_str(&format!(
                "{:<20} {:<6} {:<5} {:>5}  {}\n",
                job.name,
                endpoint.protocol().as_str(),
                endpoint.format().as_str(),
                endpoint.log_lines(),
                endpoint.url(),
            ));
        }
    }
    out
}
