use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;

use crate::error::{ClipError, ClipResult};
use crate::settings::{Settings, ToolCommand};

use super::crop::{CropFilter, parse_dimensions};
use super::process::{run_captured, run_passthrough};

pub(crate) const DOWNLOAD_TEMPLATE: &str = "temp.%(ext)s";

const DOWNLOADER_ENV: &str = "CLIPCROP_YTDLP_BIN";
const TRANSCODER_ENV: &str = "CLIPCROP_FFMPEG_BIN";
const PROBER_ENV: &str = "CLIPCROP_FFPROBE_BIN";

/// Captured result of a tool whose stdout is parsed.
#[derive(Debug, Clone)]
pub(crate) struct ToolOutput {
    pub(crate) success: bool,
    pub(crate) status: String,
    pub(crate) stdout: String,
    pub(crate) stderr: String,
}

/// The three external tools plus the directory downloads land in.
#[derive(Debug, Clone)]
pub(crate) struct Toolchain {
    pub(crate) downloader: ToolCommand,
    pub(crate) transcoder: ToolCommand,
    pub(crate) prober: ToolCommand,
    pub(crate) work_dir: PathBuf,
}

impl Toolchain {
    /// `work_dir` is made absolute since tools run inside it while paths are
    /// passed to them.
    pub(crate) fn resolve(settings: &Settings, work_dir: PathBuf) -> Self {
        let work_dir = std::path::absolute(&work_dir).unwrap_or(work_dir);
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let exe_dir = exe_dir.as_deref();
        Self {
            downloader: resolve_tool(
                env::var_os(DOWNLOADER_ENV),
                settings.downloader.as_ref(),
                exe_dir,
                "yt-dlp",
            ),
            transcoder: resolve_tool(
                env::var_os(TRANSCODER_ENV),
                settings.transcoder.as_ref(),
                exe_dir,
                "ffmpeg",
            ),
            prober: resolve_tool(
                env::var_os(PROBER_ENV),
                settings.prober.as_ref(),
                exe_dir,
                "ffprobe",
            ),
            work_dir,
        }
    }

    pub(crate) fn downloader_name(&self) -> String {
        tool_label(&self.downloader)
    }

    /// `yt-dlp -F <url>`.
    pub(crate) fn list_formats(&self, url: &str) -> ClipResult<ToolOutput> {
        let mut cmd = self.command(&self.downloader);
        cmd.arg("-F").arg(url);
        let name = self.downloader_name();
        tracing::debug!(tool = %name, url, "listing formats");
        let output = run_captured(cmd).map_err(|source| ClipError::ToolLaunch {
            tool: name,
            source,
        })?;
        Ok(ToolOutput {
            success: output.status.success(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// `yt-dlp -f <id> [--download-sections <section>] -o temp.%(ext)s <url>`.
    pub(crate) fn download(
        &self,
        format_id: &str,
        section: Option<&str>,
        url: &str,
    ) -> ClipResult<()> {
        let mut cmd = self.command(&self.downloader);
        cmd.arg("-f").arg(format_id);
        if let Some(section) = section {
            cmd.arg("--download-sections").arg(section);
        }
        cmd.arg("-o").arg(DOWNLOAD_TEMPLATE).arg(url);
        self.run_checked(cmd, &self.downloader)
    }

    /// Width and height of the first video stream, or `None` when the prober
    /// fails or prints something else.
    pub(crate) fn probe_dimensions(&self, path: &Path) -> Option<(u32, u32)> {
        let mut cmd = self.command(&self.prober);
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=p=0:s=x",
        ])
        .arg(path);

        let output = match run_captured(cmd) {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(tool = %tool_label(&self.prober), %err, "prober failed to start");
                return None;
            }
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                status = %output.status,
                stderr = %stderr.trim(),
                "prober exited unsuccessfully"
            );
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let dimensions = parse_dimensions(&stdout);
        if dimensions.is_none() {
            tracing::warn!(output = %stdout.trim(), "unparseable probe result");
        }
        dimensions
    }

    /// `ffmpeg -y -i <input> -filter:v <filter> -an <output>`.
    pub(crate) fn crop(&self, input: &Path, filter: &CropFilter, output: &Path) -> ClipResult<()> {
        let mut cmd = self.command(&self.transcoder);
        cmd.arg("-y")
            .arg("-i")
            .arg(input)
            .arg("-filter:v")
            .arg(filter.to_string())
            .arg("-an")
            .arg(output);
        self.run_checked(cmd, &self.transcoder)
    }

    /// `ffmpeg -y -f concat -safe 0 -i <manifest> -c copy <output>`.
    pub(crate) fn concat(&self, manifest: &Path, output: &Path) -> ClipResult<()> {
        let mut cmd = self.command(&self.transcoder);
        cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(manifest)
            .args(["-c", "copy"])
            .arg(output);
        self.run_checked(cmd, &self.transcoder)
    }

    fn command(&self, tool: &ToolCommand) -> ProcessCommand {
        let mut cmd = ProcessCommand::new(&tool.program);
        cmd.args(&tool.args).current_dir(&self.work_dir);
        cmd
    }

    fn run_checked(&self, cmd: ProcessCommand, tool: &ToolCommand) -> ClipResult<()> {
        let name = tool_label(tool);
        tracing::debug!(command = ?cmd, "running tool");
        let output = run_passthrough(cmd).map_err(|source| ClipError::ToolLaunch {
            tool: name.clone(),
            source,
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(ClipError::tool_failed(&name, output.status, &stderr));
        }
        if !stderr.trim().is_empty() {
            tracing::debug!(tool = %name, stderr = %stderr.trim(), "tool finished");
        }
        Ok(())
    }
}

fn tool_label(tool: &ToolCommand) -> String {
    let program = tool
        .program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| tool.program.display().to_string());
    if tool.args.is_empty() {
        program
    } else {
        format!("{program} {}", tool.args.join(" "))
    }
}

/// Environment override, then settings, then a copy shipped next to the
/// executable, then the bare name for PATH lookup.
pub(crate) fn resolve_tool(
    env_value: Option<OsString>,
    configured: Option<&ToolCommand>,
    exe_dir: Option<&Path>,
    name: &str,
) -> ToolCommand {
    if let Some(value) = env_value
        && !value.is_empty()
    {
        return anchor_program(ToolCommand::new(value));
    }
    if let Some(configured) = configured {
        return anchor_program(configured.clone());
    }
    if let Some(dir) = exe_dir {
        let bundled = dir.join(format!("{name}{}", env::consts::EXE_SUFFIX));
        if bundled.is_file() {
            return ToolCommand::new(bundled);
        }
    }
    ToolCommand::new(name)
}

/// Tools run inside the work directory, so a relative path such as
/// `./bin/yt-dlp` is resolved against the launching directory first. Bare
/// names are left for PATH lookup.
fn anchor_program(mut tool: ToolCommand) -> ToolCommand {
    if tool.program.is_relative()
        && tool.program.components().count() > 1
        && let Ok(absolute) = std::path::absolute(&tool.program)
    {
        tool.program = absolute;
    }
    tool
}
