//! Tests for duration tables, probing and playlist building.
//!
//! HTTP behavior is exercised against mock servers; audio is generated
//! in memory as WAV.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use tilawa_catalog::{
    AudioDurationProbe, CatalogError, DurationProbe, DurationTable, DurationTableLoader,
    PlaylistBuilder, ProgramLoader, ResourceLocation,
};
use tilawa_core::{ProgramId, Segment, SegmentKey, SourceUnit, TextRef};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// =============================================================================
// Helpers
// =============================================================================

fn wav(seconds: f64) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(8000.0 * seconds) as usize {
            writer.write_sample((i % 128) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn http_loader(url: &str) -> DurationTableLoader {
    DurationTableLoader::new(
        reqwest::Client::new(),
        ResourceLocation::parse(url).unwrap(),
    )
}

fn verse_unit(surah: u16, verse: u16, audio: Option<String>) -> SourceUnit {
    SourceUnit::new(
        SegmentKey::verse(surah, verse),
        audio,
        TextRef::new(format!("verse-{verse}")),
    )
}

const TABLE: &str = r#"{
    "58": { "reciter": "7", "verses": { "58:1": 12.5, "58:2": 9.25 } },
    "59": { "segments": { "59:1": 7.0 } }
}"#;

// =============================================================================
// Duration Table Tests
// =============================================================================

mod duration_table {
    use super::*;

    #[tokio::test]
    async fn test_fetched_once_per_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quran/audio-durations.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TABLE))
            .expect(1)
            .mount(&server)
            .await;

        let loader = http_loader(&format!("{}/quran/audio-durations.json", server.uri()));
        assert!(!loader.is_loaded());

        let first = loader.load().await;
        let second = loader.load().await;

        assert!(loader.is_loaded());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            first.lookup(&ProgramId::surah(58), &SegmentKey::verse(58, 2)),
            Some(9.25)
        );
        assert_eq!(
            first.lookup(&ProgramId::surah(59), &SegmentKey::verse(59, 1)),
            Some(7.0)
        );
    }

    #[tokio::test]
    async fn test_not_found_degrades_to_empty_and_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let loader = http_loader(&format!("{}/durations.json", server.uri()));

        assert!(loader.load().await.is_empty());
        assert!(loader.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_reports_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let loader = http_loader(&format!("{}/durations.json", server.uri()));
        match loader.fetch().await {
            Err(CatalogError::ServerError { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("Expected ServerError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_document_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let loader = http_loader(&format!("{}/durations.json", server.uri()));
        assert!(matches!(loader.fetch().await, Err(CatalogError::ParseError(_))));
        assert!(loader.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_empty() {
        let loader = http_loader("http://127.0.0.1:1/durations.json");
        assert!(loader.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_file_backed_table() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("audio-durations.json");
        std::fs::write(&file, TABLE).unwrap();

        let by_path = DurationTableLoader::new(
            reqwest::Client::new(),
            ResourceLocation::parse(file.to_str().unwrap()).unwrap(),
        );
        let by_url = DurationTableLoader::new(
            reqwest::Client::new(),
            ResourceLocation::parse(url::Url::from_file_path(&file).unwrap().as_str()).unwrap(),
        );

        let a = by_path.load().await;
        let b = by_url.load().await;
        assert_eq!(*a, *b);
        assert_eq!(a.program_count(), 2);
    }
}

// =============================================================================
// Probe Tests
// =============================================================================

mod probe {
    use super::*;

    #[tokio::test]
    async fn test_probes_remote_audio() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Alafasy/mp3/001001.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wav(1.25)))
            .mount(&server)
            .await;

        let probe = AudioDurationProbe::new(reqwest::Client::new());
        let seconds = probe
            .probe(&format!("{}/Alafasy/mp3/001001.wav", server.uri()))
            .await
            .unwrap();

        assert!((seconds - 1.25).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_missing_audio_is_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let probe = AudioDurationProbe::new(reqwest::Client::new());
        let result = probe.probe(&format!("{}/missing.mp3", server.uri())).await;
        assert!(matches!(
            result,
            Err(CatalogError::ServerError { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_non_audio_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>captive portal</html>"))
            .mount(&server)
            .await;

        let probe = AudioDurationProbe::new(reqwest::Client::new());
        let result = probe.probe(&format!("{}/001001.mp3", server.uri())).await;
        assert!(matches!(
            result,
            Err(CatalogError::DecodeOrMetadataFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_audio() {
        let probe = AudioDurationProbe::new(reqwest::Client::new());
        let result = probe.probe("http://127.0.0.1:1/001001.mp3").await;
        assert!(matches!(result, Err(CatalogError::ResourceUnreachable(_))));
    }
}

// =============================================================================
// Playlist Building Tests
// =============================================================================

mod building {
    use super::*;

    async fn audio_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/audio/1.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wav(1.0)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/audio/2.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wav(2.5)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/audio/3.wav"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_table_failure_falls_back_to_probing() {
        let server = audio_server().await;
        Mock::given(method("GET"))
            .and(path("/durations.json"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let builder = PlaylistBuilder::new(
            Arc::new(http_loader(&format!("{}/durations.json", server.uri()))),
            Arc::new(AudioDurationProbe::new(reqwest::Client::new())),
        );

        let units = (1..=3)
            .map(|v| verse_unit(1, v, Some(format!("{}/audio/{v}.wav", server.uri()))))
            .collect();
        let playlist = builder.build(&ProgramId::surah(1), units).await;

        let durations: Vec<f64> = playlist.iter().map(Segment::duration_seconds).collect();
        assert_eq!(playlist.len(), 3);
        assert!((durations[0] - 1.0).abs() < 1e-6);
        assert!((durations[1] - 2.5).abs() < 1e-6);
        assert_eq!(durations[2], 0.0);
        assert!((playlist.total_duration() - durations.iter().sum::<f64>()).abs() < 1e-9);
        // The failed probe still leaves a playable segment
        assert!(playlist.get(2).unwrap().is_playable());
    }

    #[tokio::test]
    async fn test_table_entries_skip_probing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/durations.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(TABLE))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/audio/58/1.mp3"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let builder = PlaylistBuilder::new(
            Arc::new(http_loader(&format!("{}/durations.json", server.uri()))),
            Arc::new(AudioDurationProbe::new(reqwest::Client::new())),
        );

        let units = vec![
            verse_unit(58, 1, Some(format!("{}/audio/58/1.mp3", server.uri()))),
            verse_unit(58, 2, Some(format!("{}/audio/58/2.mp3", server.uri()))),
            verse_unit(58, 3, None),
        ];
        let playlist = builder.build(&ProgramId::surah(58), units).await;

        assert_eq!(playlist.total_duration(), 21.75);
        assert!(!playlist.get(2).unwrap().is_playable());
    }
}

// =============================================================================
// Program Loader Tests
// =============================================================================

mod loader {
    use super::*;

    fn loader() -> ProgramLoader {
        ProgramLoader::new(PlaylistBuilder::new(
            Arc::new(DurationTableLoader::preloaded(DurationTable::empty())),
            Arc::new(AudioDurationProbe::new(reqwest::Client::new())),
        ))
    }

    #[tokio::test]
    async fn test_newer_load_supersedes_slow_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/slow.wav"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(wav(1.0))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/fast.wav"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(wav(0.5)))
            .mount(&server)
            .await;

        let loader = loader();
        let slow = vec![verse_unit(1, 1, Some(format!("{}/slow.wav", server.uri())))];
        let fast = vec![verse_unit(2, 1, Some(format!("{}/fast.wav", server.uri())))];

        let (first, second) = tokio::join!(loader.load(ProgramId::surah(1), slow), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            loader.load(ProgramId::surah(2), fast).await
        });

        assert!(first.is_none());
        let second = second.expect("newer load should complete");
        assert_eq!(second.generation, 2);
        assert_eq!(second.playlist.program_id().as_str(), "2");
        assert_eq!(loader.current_generation(), 2);
    }

    #[tokio::test]
    async fn test_cancel_abandons_load() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(wav(1.0))
                    .set_delay(Duration::from_secs(10)),
            )
            .mount(&server)
            .await;

        let loader = loader();
        let units = vec![verse_unit(1, 1, Some(format!("{}/slow.wav", server.uri())))];

        let (result, ()) = tokio::join!(loader.load(ProgramId::surah(1), units), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            loader.cancel().await;
        });

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_sequential_loads_all_complete() {
        let loader = loader();

        let first = loader
            .load(ProgramId::surah(1), vec![verse_unit(1, 1, None)])
            .await
            .unwrap();
        let second = loader
            .load(ProgramId::surah(2), vec![verse_unit(2, 1, None)])
            .await
            .unwrap();

        assert!(second.generation > first.generation);
        assert_eq!(first.playlist.len(), 1);
    }
}
