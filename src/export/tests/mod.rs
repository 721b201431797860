//! Unit tests for the exporters and the bundle they produce.


use crate::export::ExportRecord;
use crate::model::{BoundingBox, BoxId, BoxSource, ImageId, Rect};

/// Box given in pixels of a `width` x `height` image.
fn pixel_box(id: u64, label: &str, px: [f32; 4], width: u32, height: u32) -> BoundingBox {
    let (w, h) = (width as f32, height as f32);
    BoundingBox::new(
        BoxId(id),
        label,
        Rect::new(px[0] / w, px[1] / h, px[2] / w, px[3] / h),
        BoxSource::HumanAdded,
    )
}

/// Two images: a person and a car on the first, another person on the second.
fn sample_records() -> Vec<ExportRecord> {
    vec![
        ExportRecord {
            image_id: ImageId(1),
            original_file_name: "train/photo001.jpg".to_string(),
            pixel_width: 640,
            pixel_height: 480,
            boxes: vec![
                pixel_box(1, "person", [100.0, 120.0, 80.0, 200.0], 640, 480),
                pixel_box(2, "car", [300.0, 200.0, 150.0, 100.0], 640, 480),
            ],
        },
        ExportRecord {
            image_id: ImageId(2),
            original_file_name: "photo002.png".to_string(),
            pixel_width: 800,
            pixel_height: 600,
            boxes: vec![pixel_box(1, "person", [0.0, 0.0, 400.0, 300.0], 800, 600)],
        },
    ]
}

fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}
