use super::*;

use crate::render::blend::BlendMode;
use crate::scene::layer::LayerKind;

const SCENE: &str = r#"{
    "settings": {"width": 320, "height": 180, "quality": "draft"},
    "layers": [
        {
            "id": "bg",
            "kind": "image",
            "start_time": 0.0,
            "end_time": 10.0,
            "keyframes": [
                {"time": 2.0, "property": "opacity", "value": 0.0},
                {"time": 0.0, "property": "opacity", "value": 1.0}
            ]
        },
        {
            "id": "title",
            "kind": "text",
            "start_time": 1.0,
            "end_time": 3.0,
            "blend_mode": "screen",
            "transform": {"position": {"x": 10.0, "y": 20.0, "z": 1.0}},
            "effects": [{"id": "blur", "type": "gaussian-blur", "params": {"radius": 2.0}}]
        }
    ]
}"#;

#[test]
fn parses_settings_and_layers_in_order() {
    let desc = SceneDesc::from_json(SCENE).unwrap();
    assert_eq!((desc.settings.width, desc.settings.height), (320, 180));
    assert_eq!(desc.layers.len(), 2);
    assert_eq!(desc.layers[0].layer.id.as_str(), "bg");
    assert_eq!(desc.layers[1].layer.kind, LayerKind::Text);
    assert_eq!(desc.layers[1].layer.blend_mode, BlendMode::Screen);
    assert_eq!(desc.layers[1].layer.transform.position.z, 1.0);
    assert!(desc.layers[0].source.is_none());
    assert!(desc.base_dir().is_none());
}

#[test]
fn validation_sorts_keyframes() {
    let desc = SceneDesc::from_json(SCENE).unwrap();
    let times: Vec<f64> = desc.layers[0].layer.keyframes.iter().map(|k| k.time).collect();
    assert_eq!(times, vec![0.0, 2.0]);
}

#[test]
fn duplicate_layer_ids_are_rejected() {
    let json = r#"{"layers": [
        {"id": "a", "start_time": 0.0, "end_time": 1.0},
        {"id": "a", "start_time": 0.0, "end_time": 1.0}
    ]}"#;
    assert!(matches!(
        SceneDesc::from_json(json),
        Err(ReelfxError::Validation(_))
    ));
}

#[test]
fn inverted_windows_are_rejected() {
    let json = r#"{"layers": [{"id": "a", "start_time": 5.0, "end_time": 1.0}]}"#;
    assert!(SceneDesc::from_json(json).is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        SceneDesc::from_json("{\"layers\": 3}"),
        Err(ReelfxError::Serde(_))
    ));
}

#[test]
fn missing_file_is_reported() {
    let err = SceneDesc::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open scene JSON"));
}

#[test]
fn missing_source_image_fails_to_load() {
    let json = r#"{
        "layers": [{"id": "a", "start_time": 0.0, "end_time": 1.0, "source": "nope.png"}]
    }"#;
    let desc = SceneDesc::from_json(json).unwrap();
    let err = desc.layers[0]
        .load_source(Some(Path::new("/definitely/not")))
        .unwrap_err();
    assert!(err.to_string().contains("layer 'a'"));
}

#[test]
fn source_round_trips_through_png() {
    let dir = std::env::temp_dir().join(format!("reelfx-desc-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    img.save(dir.join("src.png")).unwrap();

    let json = r#"{
        "layers": [{"id": "a", "start_time": 0.0, "end_time": 1.0, "source": "src.png"}]
    }"#;
    std::fs::write(dir.join("scene.json"), json).unwrap();

    let desc = SceneDesc::from_path(dir.join("scene.json")).unwrap();
    let loaded = desc.layers[0].load_source(desc.base_dir()).unwrap().unwrap();
    assert_eq!(loaded.dimensions(), (3, 2));
    assert_eq!(loaded.get_pixel(1, 1).0, [10, 20, 30, 255]);

    std::fs::remove_dir_all(&dir).ok();
}
