//! Hosts, headers and resource paths of the API.
//!
//! Paths are relative to the API base URL and may hold `{placeholders}`
//! resolved by [`generate_url`].

pub const HTTPS_HOST: &str = "https://api.api2convert.com/v2/";
pub const HTTP_HOST: &str = "http://api2.online-convert.com/";

pub const HEADER_OC_API_KEY: &str = "X-OC-API-KEY";
pub const HEADER_OC_JOB_TOKEN: &str = "X-OC-TOKEN";
pub const HEADER_OC_SDK_CLIENT_VERSION: &str = "X-OC-SDK-CLIENT";
pub const HEADER_USER_AGENT: &str = "User-Agent";

pub const SDK_CLIENT_VERSION: &str = "2";
pub const CLIENT_USER_AGENT: &str = concat!("api2convert-rs/", env!("CARGO_PKG_VERSION"));

pub const STATUSES: &str = "statuses";
pub const CONVERSIONS: &str = "conversions";
pub const SCHEMA: &str = "schema";

pub const JOBS: &str = "jobs";
pub const JOB_ID: &str = "jobs/{job_id}";
pub const JOB_ID_THREADS: &str = "jobs/{job_id}/threads";
pub const JOB_ID_HISTORY: &str = "jobs/{job_id}/history";
pub const JOB_ID_CONVERSIONS: &str = "jobs/{job_id}/conversions";
pub const JOB_ID_CONVERSION_ID: &str = "jobs/{job_id}/conversions/{conversion_id}";
pub const JOB_ID_INPUTS: &str = "jobs/{job_id}/input";
pub const JOB_ID_INPUT_ID: &str = "jobs/{job_id}/input/{input_id}";
pub const JOB_ID_OUTPUTS: &str = "jobs/{job_id}/output";
pub const JOB_ID_OUTPUT_ID: &str = "jobs/{job_id}/output/{output_id}";

pub const PRESETS: &str = "presets";
pub const PRESET_ID: &str = "presets/{preset_id}";

pub const STATS_DAY: &str = "stats/day/{day}";
pub const STATS_MONTH: &str = "stats/month/{month}";
pub const STATS_YEAR: &str = "stats/year/{year}";

/// Upload endpoint; `server` is an absolute URL handed out with the job.
pub const UPLOAD_FILE: &str = "{server}/upload-file/{job_id}";

/// Substitute `{name}` placeholders from `params` and append `query`.
///
/// Placeholders without a value are dropped from the result rather than
/// treated as an error, so `jobs/{job_id}` with no `job_id` becomes `jobs/`.
pub fn generate_url(template: &str, params: &[(&str, &str)], query: &[(&str, &str)]) -> String {
    let mut url = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        url.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        match after.find('}') {
            Some(close) if is_placeholder_name(&after[..close]) => {
                let name = &after[..close];
                match params.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => url.push_str(value),
                    None => tracing::debug!(
                        placeholder = name,
                        template,
                        "unresolved placeholder dropped"
                    ),
                }
                rest = &after[close + 1..];
            }
            _ => {
                url.push('{');
                rest = after;
            }
        }
    }
    url.push_str(rest);

    if !query.is_empty() {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        url.push('?');
        url.push_str(&encoded);
    }

    url
}

fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
