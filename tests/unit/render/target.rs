use super::*;
use crate::gpu::recording::RecordingGpu;

#[test]
fn primary_target_gets_depth_and_is_tracked() {
    let mut gpu = RecordingGpu::new();
    let mut targets = RenderTargetManager::new();
    let t = targets
        .create(&mut gpu, 64, 32, TextureFormat::Rgba8, true)
        .unwrap();
    assert!(t.depth.is_some());
    assert_eq!((t.width, t.height), (64, 32));
    assert_eq!(targets.outstanding(), 1);

    let live = gpu.live_resources();
    assert_eq!(
        (live.framebuffers, live.textures, live.depth_buffers),
        (1, 1, 1)
    );

    targets.dispose(&mut gpu, t);
    assert_eq!(targets.outstanding(), 0);
    assert_eq!(gpu.live_resources().total(), 0);
}

#[test]
fn incomplete_framebuffer_releases_partial_resources() {
    let mut gpu = RecordingGpu::new();
    gpu.set_framebuffers_incomplete(true);
    let mut targets = RenderTargetManager::new();

    let err = targets
        .create(&mut gpu, 8, 8, TextureFormat::Rgba8, true)
        .unwrap_err();
    assert!(matches!(
        err,
        ReelfxError::IncompleteFramebuffer {
            status: FramebufferStatus::IncompleteAttachment
        }
    ));
    assert_eq!(gpu.live_resources().total(), 0);
    assert_eq!(targets.outstanding(), 0);
}

#[test]
fn empty_targets_are_rejected() {
    let mut gpu = RecordingGpu::new();
    let mut targets = RenderTargetManager::new();
    assert!(
        targets
            .create(&mut gpu, 0, 8, TextureFormat::Rgba8, false)
            .is_err()
    );
    assert_eq!(gpu.created_resources().total(), 0);
}

#[test]
fn resize_keeps_handles() {
    let mut gpu = RecordingGpu::new();
    let mut targets = RenderTargetManager::new();
    let mut t = targets
        .create(&mut gpu, 16, 16, TextureFormat::Rgba16F, false)
        .unwrap();
    let (fb, tex) = (t.framebuffer, t.texture);

    targets.resize(&mut gpu, &mut t, 40, 20);
    assert_eq!((t.framebuffer, t.texture), (fb, tex));
    assert_eq!((t.width, t.height), (40, 20));
    let desc = gpu.texture_desc(tex).unwrap();
    assert_eq!((desc.width, desc.height), (40, 20));
    assert_eq!(desc.format, TextureFormat::Rgba16F);
    assert_eq!(gpu.created_resources().textures, 1);
}

#[test]
fn dispose_all_then_dispose_is_harmless() {
    let mut gpu = RecordingGpu::new();
    let mut targets = RenderTargetManager::new();
    let a = targets
        .create(&mut gpu, 4, 4, TextureFormat::Rgba8, false)
        .unwrap();
    targets
        .create(&mut gpu, 4, 4, TextureFormat::Rgba8, true)
        .unwrap();

    targets.dispose_all(&mut gpu);
    assert_eq!(gpu.live_resources().total(), 0);

    targets.dispose(&mut gpu, a);
    assert_eq!(gpu.invalid_deletes(), 0);
}
