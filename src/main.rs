//! Scripted demo session for native builds.
//!
//! Ingests two synthetic images, seeds them with detections from an offline
//! collaborator, edits one image through the pointer state machine and
//! prints the YOLO and COCO exports.
//!
//! Usage: `bbox-studio [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = native::run() {
        eprintln!("Application error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::error::Error;
    use std::io::Cursor;

    use bbox_studio::ai::{ApiKey, ImagePayload};
    use bbox_studio::display_math::PixelPoint;
    use bbox_studio::editor::{ResizeHandle, Tool};
    use bbox_studio::export::{CocoExporter, Exporter, YoloExporter};
    use bbox_studio::model::SuggestedBox;
    use bbox_studio::{AiClient, AiError, Assistant, Detector, NewImage, ResultStore, StudioConfig};
    use serde_json::{Value, json};

    /// Stand-in for a remote detector: one box in the middle of every image.
    struct OfflineDetector;

    impl Detector for OfflineDetector {
        async fn detect(
            &self,
            _key: &ApiKey,
            images: &[ImagePayload<'_>],
            prompt: &str,
        ) -> Result<Value, AiError> {
            let centered = json!([{
                "label": prompt, "x_min": 0.3, "y_min": 0.3, "width": 0.4, "height": 0.4
            }]);
            Ok(Value::Array(vec![centered; images.len()]))
        }
    }

    /// Stand-in for a remote assistant: suggests a box right of the last one.
    struct OfflineAssistant;

    impl Assistant for OfflineAssistant {
        async fn assist(
            &self,
            _key: &ApiKey,
            _image: ImagePayload<'_>,
            prompt: &str,
            existing: &[SuggestedBox],
        ) -> Result<Value, AiError> {
            let x = existing.last().map_or(0.1, |b| b.x_min + b.width + 0.05);
            Ok(json!({
                "boxes": [{
                    "label": prompt, "x_min": x, "y_min": 0.6, "width": 0.15, "height": 0.2
                }]
            }))
        }
    }

    fn load_config() -> Result<StudioConfig, Box<dyn Error>> {
        match std::env::args().nth(1) {
            Some(path) => Ok(StudioConfig::from_json(&std::fs::read_to_string(path)?)?),
            None => Ok(StudioConfig::default()),
        }
    }

    fn synthetic_png(width: u32, height: u32) -> Result<Vec<u8>, Box<dyn Error>> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 255 / width) as u8, (y * 255 / height) as u8, 128])
        });
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
        Ok(bytes)
    }

    pub fn run() -> Result<(), Box<dyn Error>> {
        let config = load_config()?;
        env_logger::Builder::new()
            .filter_level(config.preferences.log_level.to_level_filter())
            .init();

        let mut ai_settings = config.ai.clone();
        if ai_settings.credentials().is_err() {
            log::info!("No API key configured, using offline collaborators");
            ai_settings.api_key = Some("offline".to_string());
        }

        let mut store = ResultStore::new();
        let street = NewImage::from_encoded("street.png", synthetic_png(640, 480)?)?;
        let park = NewImage::from_encoded("park.png", synthetic_png(300, 400)?)?;
        let street = store.add_image(street);
        store.add_image(park);

        let detector = AiClient::new(OfflineDetector, ai_settings.clone());
        let records = store.records();
        let outcome = pollster::block_on(detector.detect_batched_with(&records, "car", |batch| {
            for rejected in store.seed_detections(batch.to_vec()) {
                log::warn!("{rejected}");
            }
        }))?;
        if let Some(e) = &outcome.error {
            log::warn!("Detection stopped early: {e}");
        }

        // 640x480 in a 400x300 view: scale 0.625, no letterbox.
        let mut session = store.open_session(street, &config.editor)?;
        {
            let editor = session.editor_mut();
            editor.set_container_size(400.0, 300.0);

            editor.set_tool(Tool::DrawOnce);
            editor.set_draw_label("person")?;
            editor.pointer_down(PixelPoint::new(20.0, 40.0));
            editor.pointer_move(PixelPoint::new(60.0, 160.0));
            editor.pointer_up(PixelPoint::new(60.0, 160.0));

            // Drag the detected car a little to the left.
            editor.pointer_down(PixelPoint::new(200.0, 150.0));
            editor.pointer_move(PixelPoint::new(180.0, 150.0));
            editor.pointer_up(PixelPoint::new(180.0, 150.0));

            if let Some((_, se)) = editor
                .handle_positions()
                .into_iter()
                .find(|(h, _)| *h == ResizeHandle::SE)
            {
                let target = PixelPoint::new(se.x + 30.0, se.y + 10.0);
                editor.pointer_down(se);
                editor.pointer_move(target);
                editor.pointer_up(target);
            }
        }

        let assistant = AiClient::new(OfflineAssistant, ai_settings);
        let added = pollster::block_on(session.request_assist(&assistant, "bicycle"))?;
        log::info!("Assistant added {added} boxes");

        for b in session.editor().display_boxes() {
            println!(
                "{} {:<8} {:<13} ({:.0}, {:.0}, {:.0}x{:.0}) {}",
                b.id,
                b.label,
                b.source.name(),
                b.rect.x,
                b.rect.y,
                b.rect.width,
                b.rect.height,
                b.color.as_deref().unwrap_or("-")
            );
        }
        store.save(session)?;

        let records = store.export_records();
        for exporter in [&YoloExporter as &dyn Exporter, &CocoExporter] {
            let bundle = exporter.export(&records)?;
            println!("\n== {} ==", exporter.display_name());
            for file in &bundle.files {
                println!("-- {}\n{}", file.path, String::from_utf8_lossy(&file.contents));
            }
            println!("({} byte zip)", bundle.to_zip()?.len());
        }
        Ok(())
    }
}
