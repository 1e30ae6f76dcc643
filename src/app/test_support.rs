//! Fake `yt-dlp`, `ffmpeg` and `ffprobe` scripts that record their argv.
//!
//! Scripts are run through `sh <script>` so nothing has to be marked
//! executable. Behavior is steered by control files in the sandbox:
//! `ext` (download container, default `mp4`), `probe` (prober stdout; the
//! prober fails when absent), `fail-download` and `no-output`.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::settings::ToolCommand;

use super::pipeline::Toolchain;

pub(crate) const SAMPLE_LISTING: &str = "\
[youtube] Extracting URL: https://www.youtube.com/watch?v=abc123
[info] Available formats for abc123:
ID  EXT   RESOLUTION FPS CH |   FILESIZE   TBR PROTO | VCODEC          VBR ACODEC      ABR ASR MORE INFO
sb0 mhtml 48x27        0    |                  mhtml | images                                  storyboard
139 m4a   audio only      2 |    1.05MiB   49k https | audio only          mp4a.40.5   49k 22k low, m4a_dash
251 webm  audio only      2 |    3.17MiB  148k https | audio only          opus       148k 48k medium, webm_dash
160 mp4   256x144     30    |    1.60MiB   75k https | avc1.4d400c    75k video only              144p, mp4_dash
278 webm  256x144     30    |    1.86MiB   87k https | vp9            87k video only              144p, webm_dash
136 mp4   1280x720    30    |   24.15MiB 1131k https | avc1.4d401f  1131k video only              720p, mp4_dash
247 webm  1280x720    30    |   21.78MiB 1020k https | vp9          1020k video only              720p, webm_dash
137 mp4   1920x1080   30    |   86.29MiB 4041k https | avc1.640028  4041k video only              1080p, mp4_dash
248 webm  1920x1080   30    |   56.46MiB 2644k https | vp9          2644k video only              1080p, webm_dash
18  mp4   640x360     30  2 |   12.30MiB  576k https | avc1.42001E        mp4a.40.2       44k 360p
";

pub(crate) struct FakeTools {
    sandbox: TempDir,
    pub(crate) toolchain: Toolchain,
}

impl FakeTools {
    pub(crate) fn new() -> Self {
        let sandbox = tempfile::tempdir().expect("create sandbox");
        let root = sandbox.path().to_path_buf();
        let work_dir = root.join("work");
        fs::create_dir_all(&work_dir).expect("create work dir");
        fs::write(root.join("listing.txt"), SAMPLE_LISTING).expect("write listing");
        fs::write(root.join("ext"), "mp4").expect("write ext");
        fs::write(root.join("probe"), "1920x1080\n").expect("write probe");

        let log = root.join("calls.log");
        let downloader = write_script(&root, "yt-dlp.sh", &downloader_script(&root, &log));
        let transcoder = write_script(&root, "ffmpeg.sh", &transcoder_script(&root, &log));
        let prober = write_script(&root, "ffprobe.sh", &prober_script(&root, &log));

        Self {
            toolchain: Toolchain {
                downloader: sh(&downloader),
                transcoder: sh(&transcoder),
                prober: sh(&prober),
                work_dir,
            },
            sandbox,
        }
    }

    pub(crate) fn root(&self) -> &Path {
        self.sandbox.path()
    }

    pub(crate) fn output_dir(&self) -> PathBuf {
        self.root().join("out")
    }

    pub(crate) fn set_control(&self, name: &str, value: &str) {
        fs::write(self.root().join(name), value).expect("write control file");
    }

    pub(crate) fn clear_control(&self, name: &str) {
        let _ = fs::remove_file(self.root().join(name));
    }

    /// One line per tool call: tool name followed by its arguments.
    pub(crate) fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub(crate) fn calls_to(&self, tool: &str) -> Vec<String> {
        let prefix = format!("{tool} ");
        self.calls()
            .into_iter()
            .filter(|line| line.starts_with(&prefix))
            .collect()
    }

    /// Manifest contents the last concat call was given.
    pub(crate) fn concat_manifest(&self) -> Option<String> {
        fs::read_to_string(self.root().join("manifest-seen.txt")).ok()
    }
}

fn sh(script: &Path) -> ToolCommand {
    ToolCommand::new("sh").with_args([script.to_string_lossy().into_owned()])
}

fn write_script(root: &Path, name: &str, body: &str) -> PathBuf {
    let path = root.join(name);
    fs::write(&path, body).expect("write fake tool script");
    path
}

fn downloader_script(root: &Path, log: &Path) -> String {
    let root = root.display();
    let log = log.display();
    format!(
        r#"echo "yt-dlp $*" >> '{log}'
if [ "$1" = "-F" ]; then
  cat '{root}/listing.txt'
  exit 0
fi
if [ -f '{root}/fail-download' ]; then
  echo "ERROR: [youtube] abc123: Requested format is not available" >&2
  exit 1
fi
if [ -f '{root}/no-output' ]; then
  exit 0
fi
out=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then out="$arg"; fi
  prev="$arg"
done
ext=$(cat '{root}/ext')
printf 'video' > "${{out%%.*}}.$ext"
"#
    )
}

fn transcoder_script(root: &Path, log: &Path) -> String {
    let root = root.display();
    let log = log.display();
    format!(
        r#"echo "ffmpeg $*" >> '{log}'
prev=""
input=""
for arg in "$@"; do
  if [ "$prev" = "-i" ]; then input="$arg"; fi
  prev="$arg"
  last="$arg"
done
if [ "$2" = "-f" ] && [ "$3" = "concat" ]; then
  cp "$input" '{root}/manifest-seen.txt'
fi
printf 'encoded' > "$last"
"#
    )
}

fn prober_script(root: &Path, log: &Path) -> String {
    let root = root.display();
    let log = log.display();
    format!(
        r#"echo "ffprobe $*" >> '{log}'
if [ ! -f '{root}/probe' ]; then
  echo "probe unavailable" >&2
  exit 1
fi
cat '{root}/probe'
"#
    )
}
