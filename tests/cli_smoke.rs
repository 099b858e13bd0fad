use std::{
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_slidecast")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "slidecast.exe"
            } else {
                "slidecast"
            });
            p
        })
}

fn slidecast(api_key: Option<&str>) -> Command {
    let mut cmd = Command::new(exe());
    cmd.env_remove("OPENAI_BASE_URL").env_remove("RUST_LOG");
    match api_key {
        Some(key) => cmd.env("OPENAI_API_KEY", key),
        None => cmd.env_remove("OPENAI_API_KEY"),
    };
    cmd
}

fn generate_args(txt: &Path, image: &Path, out: &Path) -> Vec<String> {
    vec![
        "generate".to_string(),
        "--input-txt".to_string(),
        txt.to_string_lossy().to_string(),
        "--input-image".to_string(),
        image.to_string_lossy().to_string(),
        "--output-video".to_string(),
        out.to_string_lossy().to_string(),
    ]
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

#[test]
fn cli_help_lists_both_commands() {
    let out = Command::new(exe()).arg("--help").output().unwrap();
    assert!(out.status.success());
    let help = String::from_utf8_lossy(&out.stdout);
    assert!(help.contains("generate"));
    assert!(help.contains("merge"));
}

#[test]
fn cli_generate_without_api_key_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("script.txt");
    let img = dir.path().join("1.png");
    std::fs::write(&txt, "Hello").unwrap();
    std::fs::write(&img, "png").unwrap();
    let out_video = dir.path().join("out.mp4");

    let out = slidecast(None)
        .args(generate_args(&txt, &img, &out_video))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(78), "{}", stderr(&out));
    assert!(stderr(&out).contains("OPENAI_API_KEY"));
    assert!(!out_video.exists());
}

#[test]
fn cli_generate_with_empty_text_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("script.txt");
    let img = dir.path().join("1.png");
    std::fs::write(&txt, " \n\n ").unwrap();
    std::fs::write(&img, "png").unwrap();
    let out_video = dir.path().join("out.mp4");

    let out = slidecast(Some("sk-test"))
        .args(generate_args(&txt, &img, &out_video))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(65), "{}", stderr(&out));
    assert!(stderr(&out).contains("empty"));
    assert!(!out_video.exists());
}

#[test]
fn cli_generate_with_missing_image_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let txt = dir.path().join("script.txt");
    std::fs::write(&txt, "Hello").unwrap();

    let out = slidecast(None)
        .args(generate_args(
            &txt,
            &dir.path().join("missing.png"),
            &dir.path().join("out.mp4"),
        ))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(65), "{}", stderr(&out));
    assert!(stderr(&out).contains("missing.png"));
}

#[test]
fn cli_merge_with_one_input_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.mp4");
    std::fs::write(&a, "not really a video").unwrap();

    let out = slidecast(None)
        .arg("merge")
        .arg("--input")
        .arg(&a)
        .arg("--output-video")
        .arg(dir.path().join("joined.mp4"))
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(65), "{}", stderr(&out));
}

#[cfg(unix)]
#[test]
fn cli_merge_interrupted_by_sigint_exits_130_and_removes_the_manifest() {
    use std::{
        os::unix::fs::PermissionsExt as _,
        process::Stdio,
        time::{Duration, Instant},
    };

    let dir = tempfile::tempdir().unwrap();
    let slow_ffmpeg = dir.path().join("slow-ffmpeg.sh");
    std::fs::write(&slow_ffmpeg, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&slow_ffmpeg, std::fs::Permissions::from_mode(0o755)).unwrap();
    let a = dir.path().join("a.mp4");
    let b = dir.path().join("b.mp4");
    std::fs::write(&a, "a").unwrap();
    std::fs::write(&b, "b").unwrap();
    let joined = dir.path().join("joined.mp4");
    let manifest = dir.path().join("joined_concat_list.txt");

    let child = slidecast(None)
        .env("SLIDECAST_FFMPEG", &slow_ffmpeg)
        .arg("merge")
        .arg("--input")
        .arg(format!("{},{}", a.display(), b.display()))
        .arg("--output-video")
        .arg(&joined)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    // The manifest is written just before ffmpeg starts, after the handler is installed.
    let deadline = Instant::now() + Duration::from_secs(10);
    while !manifest.exists() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(20));
    }
    assert!(manifest.exists(), "concat never started");
    std::thread::sleep(Duration::from_millis(200));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let out = child.wait_with_output().unwrap();
    assert_eq!(out.status.code(), Some(130), "{}", stderr(&out));
    assert!(stderr(&out).contains("interrupted by user"));
    assert!(!manifest.exists());
    assert!(!joined.exists());
}
