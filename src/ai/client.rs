//! Request orchestration on top of a collaborator.

use web_time::Instant;

use crate::config::AiSettings;
use crate::model::{BoundingBox, ImageId, ImageRecord, SuggestedBox};

use super::collaborator::{Assistant, Detector, ImagePayload};
use super::error::AiError;
use super::response::{parse_assist, parse_detection};

/// Results of a batched detection run.
///
/// Batches that completed before a failure are kept; `error` holds the
/// failure that stopped the remaining batches, if any.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub completed: Vec<(ImageId, Vec<SuggestedBox>)>,
    pub error: Option<AiError>,
    pub batches_run: usize,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Total suggestions across completed images.
    pub fn suggestion_count(&self) -> usize {
        self.completed.iter().map(|(_, s)| s.len()).sum()
    }
}

/// Validates requests, resolves credentials and checks responses before
/// anything reaches the caller.
pub struct AiClient<C> {
    collaborator: C,
    settings: AiSettings,
}

impl<C> AiClient<C> {
    pub fn new(collaborator: C, settings: AiSettings) -> Self {
        Self {
            collaborator,
            settings,
        }
    }

    pub fn settings(&self) -> &AiSettings {
        &self.settings
    }

    pub fn collaborator(&self) -> &C {
        &self.collaborator
    }
}

impl<C: Detector> AiClient<C> {
    /// Run detection over `images` in batches of `settings.batch_size`.
    ///
    /// Input and credential problems are returned as `Err` before any remote
    /// call. Remote failures end up in [`BatchOutcome::error`] next to the
    /// batches that already succeeded.
    pub async fn detect_batched(
        &self,
        images: &[ImageRecord],
        prompt: &str,
    ) -> Result<BatchOutcome, AiError> {
        self.detect_batched_with(images, prompt, |_| {}).await
    }

    /// Like [`detect_batched`](Self::detect_batched), but hands each batch's
    /// results to `on_batch` as soon as it completes, so they can be seeded
    /// before later batches run.
    pub async fn detect_batched_with<F>(
        &self,
        images: &[ImageRecord],
        prompt: &str,
        mut on_batch: F,
    ) -> Result<BatchOutcome, AiError>
    where
        F: FnMut(&[(ImageId, Vec<SuggestedBox>)]),
    {
        let prompt = checked_prompt(prompt)?;
        if images.is_empty() {
            return Err(AiError::invalid_input("no images selected for detection"));
        }
        let key = self.settings.credentials()?;

        let batch_size = self.settings.batch_size.max(1);
        let total = images.len().div_ceil(batch_size);
        let mut outcome = BatchOutcome::default();

        for (index, batch) in images.chunks(batch_size).enumerate() {
            let started = Instant::now();
            let payloads: Vec<ImagePayload<'_>> = batch.iter().map(ImagePayload::from).collect();
            let result = self
                .collaborator
                .detect(&key, &payloads, prompt)
                .await
                .and_then(|value| parse_detection(&value, batch.len()));
            outcome.batches_run += 1;

            match result {
                Ok(per_image) => {
                    log::info!(
                        "Detection batch {}/{} done: {} images in {:.0}ms",
                        index + 1,
                        total,
                        batch.len(),
                        started.elapsed().as_secs_f32() * 1000.0
                    );
                    let done = outcome.completed.len();
                    outcome
                        .completed
                        .extend(batch.iter().map(|record| record.id).zip(per_image));
                    on_batch(&outcome.completed[done..]);
                }
                Err(e) => {
                    log::warn!(
                        "Detection batch {}/{} failed, skipping the rest: {e}",
                        index + 1,
                        total
                    );
                    outcome.error = Some(e);
                    break;
                }
            }
        }

        Ok(outcome)
    }
}

impl<C: Assistant> AiClient<C> {
    /// Ask for additional boxes on one image. `existing` is sent as context.
    pub async fn assist(
        &self,
        image: &ImageRecord,
        prompt: &str,
        existing: &[BoundingBox],
    ) -> Result<Vec<SuggestedBox>, AiError> {
        let prompt = checked_prompt(prompt)?;
        let key = self.settings.credentials()?;
        let context: Vec<SuggestedBox> = existing.iter().map(BoundingBox::to_suggestion).collect();

        let started = Instant::now();
        let value = self
            .collaborator
            .assist(&key, ImagePayload::from(image), prompt, &context)
            .await?;
        let suggestions = parse_assist(&value)?;
        log::info!(
            "Assist for {} returned {} boxes in {:.0}ms",
            image.id,
            suggestions.len(),
            started.elapsed().as_secs_f32() * 1000.0
        );
        Ok(suggestions)
    }
}

fn checked_prompt(prompt: &str) -> Result<&str, AiError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(AiError::invalid_input("prompt is empty"));
    }
    Ok(prompt)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::{Value, json};

    use super::*;
    use crate::ai::ApiKey;

    fn settings(batch_size: usize) -> AiSettings {
        AiSettings {
            api_key: Some("test-key".to_string()),
            batch_size,
            ..AiSettings::default()
        }
    }

    fn record(id: u64) -> ImageRecord {
        ImageRecord {
            id: ImageId(id),
            pixel_width: 800,
            pixel_height: 600,
            pixels: vec![id as u8; 4].into(),
            mime_type: "image/png".to_string(),
            original_file_name: format!("img{id}.png"),
        }
    }

    fn one_box(label: &str) -> Value {
        json!([{ "label": label, "x_min": 0.1, "y_min": 0.1, "width": 0.3, "height": 0.3 }])
    }

    /// Answers each batch with one box per image, labelled by the first
    /// pixel byte. Batches listed in `fail_at` fail, and `short_at` batches
    /// drop one result.
    #[derive(Default)]
    struct FakeDetector {
        calls: Mutex<Vec<usize>>,
        fail_at: Option<usize>,
        short_at: Option<usize>,
    }

    impl Detector for FakeDetector {
        async fn detect(
            &self,
            key: &ApiKey,
            images: &[ImagePayload<'_>],
            _prompt: &str,
        ) -> Result<Value, AiError> {
            assert_eq!(key.expose(), "test-key");
            let call = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(images.len());
                calls.len() - 1
            };
            if self.fail_at == Some(call) {
                return Err(AiError::transient("rate limited"));
            }
            let mut results: Vec<Value> = images
                .iter()
                .map(|img| one_box(&format!("obj{}", img.pixels[0])))
                .collect();
            if self.short_at == Some(call) {
                results.pop();
            }
            Ok(Value::Array(results))
        }
    }

    #[derive(Default)]
    struct FakeAssistant {
        seen_context: Mutex<Vec<SuggestedBox>>,
        calls: AtomicUsize,
    }

    impl Assistant for FakeAssistant {
        async fn assist(
            &self,
            _key: &ApiKey,
            _image: ImagePayload<'_>,
            _prompt: &str,
            existing: &[SuggestedBox],
        ) -> Result<Value, AiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.seen_context.lock().unwrap() = existing.to_vec();
            Ok(json!({ "boxes": one_box("extra") }))
        }
    }

    #[test]
    fn test_batches_chunked_in_order() {
        let client = AiClient::new(FakeDetector::default(), settings(2));
        let images: Vec<ImageRecord> = (1..=5).map(record).collect();
        let outcome = pollster::block_on(client.detect_batched(&images, "find objects")).unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.batches_run, 3);
        assert_eq!(*client.collaborator().calls.lock().unwrap(), vec![2, 2, 1]);
        let ids: Vec<u64> = outcome.completed.iter().map(|(id, _)| id.0).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
        assert_eq!(outcome.completed[3].1[0].label, "obj4");
        assert_eq!(outcome.suggestion_count(), 5);
    }

    #[test]
    fn test_failure_keeps_earlier_batches() {
        let detector = FakeDetector {
            fail_at: Some(1),
            ..FakeDetector::default()
        };
        let client = AiClient::new(detector, settings(2));
        let images: Vec<ImageRecord> = (1..=6).map(record).collect();
        let outcome = pollster::block_on(client.detect_batched(&images, "find")).unwrap();

        assert_eq!(outcome.batches_run, 2);
        assert_eq!(outcome.completed.len(), 2);
        let err = outcome.error.unwrap();
        assert!(err.is_retryable());
        assert_eq!(client.collaborator().calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_batches_seed_store_as_they_complete() {
        use crate::ingest::NewImage;
        use crate::model::BoxSource;
        use crate::store::ResultStore;

        let mut store = ResultStore::new();
        for n in 1..=5u8 {
            let image =
                NewImage::from_parts(format!("img{n}.png"), "image/png", 800, 600, vec![n; 4])
                    .unwrap();
            store.add_image(image);
        }
        let detector = FakeDetector {
            fail_at: Some(2),
            ..FakeDetector::default()
        };
        let client = AiClient::new(detector, settings(2));

        let mut seen = Vec::new();
        let outcome = pollster::block_on(client.detect_batched_with(
            &store.records(),
            "find",
            |batch| {
                seen.push(batch.len());
                assert!(store.seed_detections(batch.to_vec()).is_empty());
            },
        ))
        .unwrap();

        assert_eq!(seen, vec![2, 2]);
        assert!(outcome.error.is_some());
        assert_eq!(outcome.completed.len(), 4);

        let ids = store.image_ids();
        for id in &ids[..4] {
            let boxes = store.get(*id);
            assert_eq!(boxes.len(), 1);
            assert_eq!(boxes[0].source, BoxSource::AiDetected);
        }
        assert!(store.get(ids[4]).is_empty());
    }

    #[test]
    fn test_count_mismatch_merges_nothing_from_batch() {
        let detector = FakeDetector {
            short_at: Some(0),
            ..FakeDetector::default()
        };
        let client = AiClient::new(detector, settings(5));
        let images: Vec<ImageRecord> = (1..=5).map(record).collect();
        let outcome = pollster::block_on(client.detect_batched(&images, "find")).unwrap();

        assert!(outcome.completed.is_empty());
        assert_eq!(outcome.error, Some(AiError::CountMismatch { expected: 5, found: 4 }));
    }

    #[test]
    fn test_invalid_input_rejected_before_remote_call() {
        let client = AiClient::new(FakeDetector::default(), settings(2));
        let images = vec![record(1)];

        let err = pollster::block_on(client.detect_batched(&images, "   ")).unwrap_err();
        assert!(matches!(err, AiError::InvalidInput { .. }));
        let err = pollster::block_on(client.detect_batched(&[], "find")).unwrap_err();
        assert!(matches!(err, AiError::InvalidInput { .. }));
        assert!(client.collaborator().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_missing_credentials_rejected_before_remote_call() {
        let settings = AiSettings {
            api_key: None,
            api_key_env: "BBOX_STUDIO_CLIENT_TEST_KEY_NEVER_SET".to_string(),
            batch_size: 2,
        };
        let client = AiClient::new(FakeDetector::default(), settings);
        let err = pollster::block_on(client.detect_batched(&[record(1)], "find")).unwrap_err();
        assert!(matches!(err, AiError::Configuration { .. }));
        assert!(client.collaborator().calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_assist_sends_stripped_context() {
        use crate::model::{BoxId, BoxSource, Rect};

        let client = AiClient::new(FakeAssistant::default(), settings(1));
        let existing = vec![
            BoundingBox::new(BoxId(3), "dog", Rect::new(0.1, 0.2, 0.3, 0.4), BoxSource::HumanAdded)
                .with_color("#ffffff"),
        ];
        let suggestions =
            pollster::block_on(client.assist(&record(1), "more dogs", &existing)).unwrap();

        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].label, "extra");
        let seen = client.collaborator().seen_context.lock().unwrap();
        assert_eq!(*seen, vec![SuggestedBox::new("dog", 0.1, 0.2, 0.3, 0.4)]);
    }

    #[test]
    fn test_assist_rejects_empty_prompt() {
        let client = AiClient::new(FakeAssistant::default(), settings(1));
        let err = pollster::block_on(client.assist(&record(1), "", &[])).unwrap_err();
        assert!(matches!(err, AiError::InvalidInput { .. }));
        assert_eq!(client.collaborator().calls.load(Ordering::SeqCst), 0);
    }
}
