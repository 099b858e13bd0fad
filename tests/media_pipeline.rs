#[cfg(feature = "media-ffmpeg")]
mod media_pipeline {
    use std::{
        path::{Path, PathBuf},
        process::Command,
    };

    use slidecast::{
        FfmpegTools, GenerateRequest, MediaTools, Pipeline, SlidecastError, SlidecastResult,
        SpeechConfig, SpeechSynthesizer, merge_videos,
    };

    const NARRATION_SEC: f64 = 2.0;

    /// Stands in for the speech API with a sine tone of fixed length.
    struct ToneSpeech {
        ffmpeg: PathBuf,
    }

    impl SpeechSynthesizer for ToneSpeech {
        fn synthesize(&self, _text: &str, _cfg: &SpeechConfig, out_path: &Path) -> SlidecastResult<()> {
            let status = Command::new(&self.ffmpeg)
                .args([
                    "-v",
                    "error",
                    "-y",
                    "-f",
                    "lavfi",
                    "-i",
                    "sine=frequency=440:sample_rate=48000",
                    "-t",
                    NARRATION_SEC.to_string().as_str(),
                    "-c:a",
                    "pcm_s16le",
                ])
                .arg(out_path)
                .status()
                .map_err(anyhow::Error::from)?;
            if !status.success() {
                return Err(SlidecastError::synthesis("ffmpeg failed creating the tone"));
            }
            Ok(())
        }
    }

    /// The feature is an explicit opt-in, so missing binaries fail loudly instead of passing vacuously.
    fn require_tools(tools: &FfmpegTools) {
        assert!(
            tools.is_available(),
            "the media-ffmpeg tests need ffmpeg and ffprobe ({} / {})",
            tools.ffmpeg.display(),
            tools.ffprobe.display()
        );
    }

    fn write_solid_png(path: &Path, width: u32, height: u32, rgb: [u8; 3]) {
        image::RgbImage::from_pixel(width, height, image::Rgb(rgb))
            .save(path)
            .unwrap();
    }

    /// Decode the frame shown at `at_sec` and return its size and centre pixel.
    fn frame_at(tools: &FfmpegTools, video: &Path, at_sec: f64, scratch: &Path) -> (u32, u32, [u8; 3]) {
        let png = scratch.join(format!("frame_{at_sec}.png"));
        let status = Command::new(&tools.ffmpeg)
            .args(["-v", "error", "-y", "-ss", at_sec.to_string().as_str(), "-i"])
            .arg(video)
            .args(["-frames:v", "1"])
            .arg(&png)
            .status()
            .unwrap();
        assert!(status.success(), "frame extraction failed at {at_sec}s");

        let img = image::open(&png).unwrap().to_rgb8();
        let (w, h) = img.dimensions();
        (w, h, img.get_pixel(w / 2, h / 2).0)
    }

    #[test]
    fn narrated_video_follows_audio_length_and_image_order() {
        let tools = FfmpegTools::from_env();
        require_tools(&tools);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let txt = root.join("script.txt");
        std::fs::write(&txt, "Two slides of narration.").unwrap();
        let red = root.join("red.png");
        let blue = root.join("blue.png");
        // Odd dimensions must be scaled down to even ones for yuv420p.
        write_solid_png(&red, 65, 49, [255, 0, 0]);
        write_solid_png(&blue, 64, 48, [0, 0, 255]);

        let audio = root.join("narration.wav");
        let output = root.join("out").join("narrated.mp4");
        let mut req = GenerateRequest::new(&txt, vec![red, blue], &output);
        req.audio_file = Some(audio.clone());

        let speech = ToneSpeech {
            ffmpeg: tools.ffmpeg.clone(),
        };
        let report = Pipeline::new(&speech, &tools).generate(&req).unwrap();

        assert!(report.merged);
        assert!((report.audio.duration_sec - NARRATION_SEC).abs() < 0.1);
        assert!((report.per_image_duration_sec - NARRATION_SEC / 2.0).abs() < 0.05);
        assert!(audio.is_file());
        assert!(report.workspace_removed);

        let out_sec = tools.probe_duration(&output).unwrap();
        assert!(
            (out_sec - NARRATION_SEC).abs() < 0.25,
            "output lasts {out_sec}s, narration {NARRATION_SEC}s"
        );

        let (w, h, first) = frame_at(&tools, &output, 0.4, root);
        assert_eq!((w, h), (64, 48));
        assert!(first[0] > 180 && first[2] < 80, "expected red, got {first:?}");

        let (_, _, second) = frame_at(&tools, &output, 1.5, root);
        assert!(second[2] > 180 && second[0] < 80, "expected blue, got {second:?}");
    }

    #[test]
    fn merge_concatenates_rendered_segments() {
        let tools = FfmpegTools::from_env();
        require_tools(&tools);
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let green = root.join("green.png");
        write_solid_png(&green, 32, 32, [0, 255, 0]);
        let a = root.join("a.mp4");
        let b = root.join("b.mp4");
        tools.render_segment(&green, 0.5, &a).unwrap();
        tools.render_segment(&green, 0.75, &b).unwrap();

        let a_sec = tools.probe_duration(&a).unwrap();
        assert!((a_sec - 0.5).abs() < 0.1, "segment lasts {a_sec}s");

        let joined = root.join("joined.mp4");
        merge_videos(&tools, &[a, b], &joined).unwrap();
        let joined_sec = tools.probe_duration(&joined).unwrap();
        assert!((joined_sec - 1.25).abs() < 0.15, "merged lasts {joined_sec}s");
        assert!(!root.join("joined_concat_list.txt").exists());
    }

    #[test]
    fn unreadable_image_is_a_render_error() {
        let tools = FfmpegTools::from_env();
        require_tools(&tools);
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("not_an_image.png");
        std::fs::write(&bogus, "definitely not a png").unwrap();

        let err = tools
            .render_segment(&bogus, 1.0, &dir.path().join("seg.mp4"))
            .unwrap_err();
        assert!(matches!(err, SlidecastError::Render(_)), "{err}");
    }
}
