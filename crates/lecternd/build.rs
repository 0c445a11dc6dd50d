//! Build script: generate a minimal lecternd man page for packaging.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};
use time::{OffsetDateTime, format_description::well_known::Iso8601};

const FALLBACK_DATE: &str = "1970-01-01";

fn manual_date() -> String {
    let Ok(raw) = env::var("SOURCE_DATE_EPOCH") else {
        return FALLBACK_DATE.into();
    };
    let formatted = raw
        .parse::<i64>()
        .ok()
        .and_then(|seconds| OffsetDateTime::from_unix_timestamp(seconds).ok())
        .and_then(|date| date.format(&Iso8601::DATE).ok());
    formatted.unwrap_or_else(|| {
        println!(
            "cargo:warning=Invalid SOURCE_DATE_EPOCH '{raw}'; expected integer seconds since \
             the Unix epoch; falling back to {FALLBACK_DATE}"
        );
        FALLBACK_DATE.into()
    })
}

fn render(binary_name: &str, version: &str, date: &str) -> String {
    let title = binary_name.to_uppercase();
    format!(
        ".TH \"{title}\" \"1\" \"{date}\" \"{binary_name} {version}\" \"Lectern Analysis Host\"\n\
.SH NAME\n\
{binary_name} \\- isolated content analysis host\n\
.SH SYNOPSIS\n\
.B {binary_name}\n\
[\\fB\\-\\-log\\-filter\\fR \\fIFILTER\\fR]\n\
[\\fB\\-\\-log\\-format\\fR \\fIjson\\fR|\\fIcompact\\fR]\n\
[\\fB\\-\\-max\\-envelope\\-bytes\\fR \\fIBYTES\\fR]\n\
.SH DESCRIPTION\n\
Lecternd reads JSONL request envelopes on standard input, runs one analysis\n\
job at a time, and writes one reply envelope per request to standard output.\n\
Diagnostics go to standard error.\n\
.SH ENVIRONMENT\n\
.TP\n\
.B LECTERN_LOG_FILTER\n\
Tracing filter directives.\n\
.TP\n\
.B LECTERN_LOG_FORMAT\n\
Log record format.\n\
.TP\n\
.B LECTERN_MAX_ENVELOPE_BYTES\n\
Largest accepted request line.\n"
    )
}

fn write_man_page(data: &[u8], dir: &Path, page_name: &str) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let destination = dir.join(page_name);
    let tmp = dir.join(format!("{page_name}.tmp"));
    fs::write(&tmp, data)?;
    fs::rename(&tmp, &destination)?;
    Ok(destination)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let binary_name = env::var("CARGO_BIN_NAME")
        .or_else(|_| env::var("CARGO_PKG_NAME"))
        .unwrap_or_else(|_| "lecternd".into());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION must be set by Cargo to render the manual page")?;
    let page = render(&binary_name, &version, &manual_date());

    let out_dir = PathBuf::from(env::var_os("OUT_DIR").ok_or("OUT_DIR is not set")?);
    write_man_page(page.as_bytes(), &out_dir, &format!("{binary_name}.1"))?;
    Ok(())
}
