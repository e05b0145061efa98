// Camera / gallery / crop flow coordination.
//
// Launch operations hand a request to the host and return immediately. The
// host later feeds the provider's (request code, outcome, payload) back into
// `on_result`, which decides whether the flow ends or chains into a crop.
// One flow at a time: a new launch replaces any flow still awaiting its crop.

use crate::cleanup::delete_file;
use crate::config::CaptureConfig;
use crate::error::CaptureError;
use crate::host::{CaptureHost, PhotoCallback};
use crate::locator::Locator;
use crate::models::{
    CropSize, FlowConfig, FlowId, FlowOrigin, FlowState, Outcome, RequestCode, ResultPayload,
};
use crate::paths::{default_camera_path, default_crop_template, extension_of, fill_template};
use crate::request::{CropRequest, ProviderRequest};
use crate::resolver::LocatorResolver;

/// Camera output is always JPEG
const CAMERA_OUTPUT_FORMAT: &str = "jpg";

pub struct CaptureCoordinator<H: CaptureHost, C: PhotoCallback> {
    host: H,
    callback: C,
    config: CaptureConfig,
    resolver: LocatorResolver,
    flow: FlowConfig,
    state: FlowState,
}

impl<H: CaptureHost, C: PhotoCallback> CaptureCoordinator<H, C> {
    pub fn new(host: H, callback: C, config: CaptureConfig) -> Result<Self, CaptureError> {
        config.validate()?;
        let resolver = LocatorResolver::new(host.external_storage_dir(), host.platform());
        Ok(Self {
            host,
            callback,
            config,
            resolver,
            flow: FlowConfig::default(),
            state: FlowState::default(),
        })
    }

    /// Replaces the suffix of the sharing authority; an empty suffix is rejected
    pub fn set_provider_name_append(
        &mut self,
        provider_name_append: impl Into<String>,
    ) -> Result<(), CaptureError> {
        let mut config = self.config.clone();
        config.provider_name_append = provider_name_append.into();
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn flow_config(&self) -> &FlowConfig {
        &self.flow
    }

    pub fn flow_state(&self) -> &FlowState {
        &self.state
    }

    pub fn resolver_mut(&mut self) -> &mut LocatorResolver {
        &mut self.resolver
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn callback(&self) -> &C {
        &self.callback
    }

    pub fn callback_mut(&mut self) -> &mut C {
        &mut self.callback
    }

    /// Takes a photo with the camera, writing it to `save_path`
    ///
    /// With non-zero crop dimensions the photo is cropped afterwards and the
    /// crop is written to `crop_path_template` filled with `jpg`.
    pub fn launch_camera(
        &mut self,
        save_path: &str,
        crop_width: u32,
        crop_height: u32,
        crop_path_template: &str,
    ) -> Result<(), CaptureError> {
        self.begin_flow(FlowConfig {
            crop: CropSize::new(crop_width, crop_height),
            camera_save_path: save_path.to_string(),
            crop_save_path_template: crop_path_template.to_string(),
        });
        log::debug!(
            "[{}] camera save path [{}], needs crop [{}], crop width [{}], crop height [{}]",
            self.flow_tag(),
            save_path,
            self.flow.needs_crop(),
            crop_width,
            crop_height
        );

        let output = self.camera_locator(save_path)?;
        self.host
            .launch_external(&ProviderRequest::capture(output), self.config.camera_request_code)
    }

    /// Camera without crop
    pub fn launch_camera_to(&mut self, save_path: &str) -> Result<(), CaptureError> {
        self.launch_camera(save_path, 0, 0, "")
    }

    /// Camera into the default files dir, cropped to `crop_width` x `crop_height`
    pub fn launch_camera_cropped(
        &mut self,
        crop_width: u32,
        crop_height: u32,
    ) -> Result<(), CaptureError> {
        let files_dir = self.host.files_dir();
        let save_path = default_camera_path(&files_dir, &self.config.camera_file_name);
        let crop_template = default_crop_template(&files_dir, &self.config.crop_file_template);
        self.launch_camera(&save_path, crop_width, crop_height, &crop_template)
    }

    pub fn launch_camera_default(&mut self) -> Result<(), CaptureError> {
        self.launch_camera_cropped(0, 0)
    }

    /// Picks an image from the gallery, optionally cropping it afterwards
    pub fn launch_gallery(
        &mut self,
        crop_width: u32,
        crop_height: u32,
        crop_path_template: &str,
    ) -> Result<(), CaptureError> {
        // The camera save path of an earlier flow is kept
        let camera_save_path = std::mem::take(&mut self.flow.camera_save_path);
        self.begin_flow(FlowConfig {
            crop: CropSize::new(crop_width, crop_height),
            camera_save_path,
            crop_save_path_template: crop_path_template.to_string(),
        });
        log::debug!(
            "[{}] needs crop [{}], crop width [{}], crop height [{}]",
            self.flow_tag(),
            self.flow.needs_crop(),
            crop_width,
            crop_height
        );

        self.host
            .launch_external(&ProviderRequest::pick_image(), self.config.gallery_request_code)
    }

    pub fn launch_gallery_default(&mut self) -> Result<(), CaptureError> {
        self.launch_gallery(0, 0, "")
    }

    /// Gallery with the default crop template in the files dir
    pub fn launch_gallery_cropped(
        &mut self,
        crop_width: u32,
        crop_height: u32,
    ) -> Result<(), CaptureError> {
        let files_dir = self.host.files_dir();
        let crop_template = default_crop_template(&files_dir, &self.config.crop_file_template);
        self.launch_gallery(crop_width, crop_height, &crop_template)
    }

    /// Crops `source` at the configured crop size
    ///
    /// Only valid right after a camera or gallery success.
    pub fn launch_crop(
        &mut self,
        from_camera: bool,
        source: Locator,
        output_format: &str,
    ) -> Result<(), CaptureError> {
        if self.state.origin.is_none() {
            return Err(CaptureError::InvalidState(
                "crop requested without a camera or gallery result".to_string(),
            ));
        }
        log::trace!("[{}] crop source={}, format={}", self.flow_tag(), source, output_format);

        let crop_save_path = fill_template(&self.flow.crop_save_path_template, output_format);
        log::debug!("[{}] crop save path [{}]", self.flow_tag(), crop_save_path);

        let output = Locator::from_file(&crop_save_path)?;
        let request = CropRequest::new(source, self.flow.crop, output_format, output, from_camera);
        self.host
            .launch_external(&ProviderRequest::Crop(request), self.config.crop_request_code)?;
        self.state.resolved_crop_save_path = Some(crop_save_path);
        Ok(())
    }

    /// Entry point for provider results delivered by the host
    pub fn on_result(&mut self, code: RequestCode, outcome: Outcome, payload: &ResultPayload) {
        if !self.owns(code) {
            log::warn!("Invalid request code [{}] for photo capture", code);
            return;
        }

        match outcome {
            Outcome::Ok => self.on_result_ok(code, payload),
            Outcome::Cancelled => {
                log::debug!("[{}] request [{}] cancelled", self.flow_tag(), code);
                self.callback.on_photo_cancel();
            }
            Outcome::FirstUser => log::warn!("Start of user-defined activity results"),
            Outcome::Failed(result_code) => {
                log::debug!(
                    "[{}] request [{}] failed with result [{}]",
                    self.flow_tag(),
                    code,
                    result_code
                );
                self.callback.on_photo_failed();
            }
        }
    }

    fn on_result_ok(&mut self, code: RequestCode, payload: &ResultPayload) {
        if code == self.config.camera_request_code {
            self.on_camera_ok();
        } else if code == self.config.gallery_request_code {
            self.on_gallery_ok(payload);
        } else if code == self.config.crop_request_code {
            self.on_crop_ok();
        }
    }

    fn on_camera_ok(&mut self) {
        self.state.origin = Some(FlowOrigin::Camera);
        let save_path = self.flow.camera_save_path.clone();

        if !self.flow.needs_crop() {
            self.callback.on_photo_camera(&save_path);
            return;
        }

        let chained = self
            .camera_locator(&save_path)
            .and_then(|source| self.launch_crop(true, source, CAMERA_OUTPUT_FORMAT));
        if let Err(e) = chained {
            log::error!("[{}] could not crop camera photo: {}", self.flow_tag(), e);
            self.callback.on_photo_failed();
        }
    }

    fn on_gallery_ok(&mut self, payload: &ResultPayload) {
        self.state.origin = Some(FlowOrigin::Gallery);

        let Some(data) = payload.data.as_deref() else {
            log::warn!("[{}] gallery returned no data", self.flow_tag());
            self.callback.on_photo_failed();
            return;
        };
        let locator = match Locator::parse(data) {
            Ok(locator) => locator,
            Err(e) => {
                log::error!("[{}] {}", self.flow_tag(), e);
                self.callback.on_photo_failed();
                return;
            }
        };
        let Some(image_path) = self.resolver.resolve(&locator, &self.host) else {
            log::warn!("[{}] could not resolve {} to a path", self.flow_tag(), locator);
            self.callback.on_photo_failed();
            return;
        };
        log::debug!("[{}] pick image [{}] from gallery", self.flow_tag(), image_path);

        if !self.flow.needs_crop() {
            self.callback.on_photo_gallery(&image_path);
            return;
        }

        let Some(extension) = extension_of(&image_path).map(str::to_string) else {
            log::error!("[{}] no file extension in [{}]", self.flow_tag(), image_path);
            self.callback.on_photo_failed();
            return;
        };
        if let Err(e) = self.launch_crop(false, locator, &extension) {
            log::error!("[{}] could not crop gallery photo: {}", self.flow_tag(), e);
            self.callback.on_photo_failed();
        }
    }

    fn on_crop_ok(&mut self) {
        let Some(crop_path) = self.state.resolved_crop_save_path.take() else {
            log::warn!("Crop result without a pending crop, ignoring");
            return;
        };
        log::debug!("[{}] crop save path {}", self.flow_tag(), crop_path);
        self.callback.on_photo_crop(&crop_path);

        if self.state.origin.take() == Some(FlowOrigin::Camera) {
            let camera_path = &self.flow.camera_save_path;
            log::warn!("delete file[{}] after crop", camera_path);
            if !delete_file(camera_path) {
                log::debug!("camera file [{}] was not removed", camera_path);
            }
        }
    }

    fn begin_flow(&mut self, flow: FlowConfig) {
        if self.state.awaiting_crop() {
            log::warn!(
                "[{}] discarding flow still awaiting its crop result",
                self.flow_tag()
            );
        }
        self.flow = flow;
        self.state.reset();
        self.state.flow_id = Some(FlowId::new());
    }

    /// Locator handed to other apps for the camera output file
    fn camera_locator(&self, path: &str) -> Result<Locator, CaptureError> {
        if self.host.platform().requires_shared_locators() {
            let authority = self.config.sharing_authority(&self.host.package_name());
            self.host.obtain_shared_locator(path, &authority)
        } else {
            Locator::from_file(path)
        }
    }

    fn owns(&self, code: RequestCode) -> bool {
        code == self.config.camera_request_code
            || code == self.config.gallery_request_code
            || code == self.config.crop_request_code
    }

    fn flow_tag(&self) -> String {
        self.state
            .flow_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::ACTION_CROP;
    use crate::test_support::{MockHost, PhotoEvent, RecordingCallback, PACKAGE_NAME};
    use std::fs;
    use tempfile::TempDir;

    const CAMERA: RequestCode = 11;
    const GALLERY: RequestCode = 12;
    const CROP: RequestCode = 13;

    const PICKED: &str = "content://media/external/images/media/42";

    fn coordinator(host: MockHost) -> CaptureCoordinator<MockHost, RecordingCallback> {
        CaptureCoordinator::new(
            host,
            RecordingCallback::default(),
            CaptureConfig::new(CAMERA, GALLERY, CROP),
        )
        .unwrap()
    }

    fn events(c: &CaptureCoordinator<MockHost, RecordingCallback>) -> &[PhotoEvent] {
        &c.callback().events
    }

    fn ok() -> ResultPayload {
        ResultPayload::empty()
    }

    fn crop_request(c: &CaptureCoordinator<MockHost, RecordingCallback>) -> CropRequest {
        match c.host().last_launch() {
            Some((ProviderRequest::Crop(req), code)) => {
                assert_eq!(*code, CROP);
                req.clone()
            }
            other => panic!("expected crop launch, got {:?}", other),
        }
    }

    #[test]
    fn test_new_rejects_colliding_codes() {
        let result = CaptureCoordinator::new(
            MockHost::new("/files"),
            RecordingCallback::default(),
            CaptureConfig::new(1, 1, 2),
        );
        assert!(matches!(result, Err(CaptureError::Config(_))));
    }

    #[test]
    fn test_camera_without_crop() {
        let tmp = TempDir::new().unwrap();
        let camera = tmp.path().join("camera.jpg");
        fs::write(&camera, b"jpeg").unwrap();
        let camera = camera.to_string_lossy().into_owned();

        let mut c = coordinator(MockHost::new(tmp.path()));
        c.launch_camera_to(&camera).unwrap();

        let (request, code) = c.host().last_launch().unwrap().clone();
        assert_eq!(code, CAMERA);
        assert!(matches!(request, ProviderRequest::Capture { .. }));

        c.on_result(CAMERA, Outcome::Ok, &ok());
        assert_eq!(events(&c), &[PhotoEvent::Camera(camera.clone())]);
        assert_eq!(c.host().launched.len(), 1);
        assert!(fs::metadata(&camera).is_ok());
    }

    #[test]
    fn test_camera_output_uses_shared_locator_on_new_platforms() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_camera_to("/files/camera.jpg").unwrap();
        match c.host().last_launch() {
            Some((ProviderRequest::Capture { output }, _)) => assert_eq!(
                output.as_str(),
                format!("content://{}.provider_photoutil/root/files/camera.jpg", PACKAGE_NAME)
            ),
            other => panic!("unexpected launch {:?}", other),
        }
    }

    #[test]
    fn test_camera_output_uses_file_locator_on_old_platforms() {
        let mut host = MockHost::new("/files");
        host.api_level = 23;
        host.fail_share = true;
        let mut c = coordinator(host);
        c.set_provider_name_append("unused").unwrap();
        c.launch_camera_to("/files/camera.jpg").unwrap();
        match c.host().last_launch() {
            Some((ProviderRequest::Capture { output }, _)) => {
                assert_eq!(output.as_str(), "file:///files/camera.jpg")
            }
            other => panic!("unexpected launch {:?}", other),
        }
    }

    #[test]
    fn test_custom_provider_name_append() {
        let mut c = coordinator(MockHost::new("/files"));
        c.set_provider_name_append("fileprovider").unwrap();
        c.launch_camera_to("/files/camera.jpg").unwrap();
        let (request, _) = c.host().last_launch().unwrap();
        assert!(matches!(
            request,
            ProviderRequest::Capture { output }
                if output.authority() == Some("de.example.photos.fileprovider")
        ));
    }

    #[test]
    fn test_set_provider_name_append_rejects_empty() {
        let mut c = coordinator(MockHost::new("/files"));
        assert!(matches!(
            c.set_provider_name_append(""),
            Err(CaptureError::Config(_))
        ));
        assert_eq!(c.config().provider_name_append, "provider_photoutil");

        c.launch_camera_to("/files/camera.jpg").unwrap();
        let (request, _) = c.host().last_launch().unwrap();
        assert!(matches!(
            request,
            ProviderRequest::Capture { output }
                if output.authority() == Some("de.example.photos.provider_photoutil")
        ));
    }

    #[test]
    fn test_camera_with_crop_deletes_camera_file() {
        let tmp = TempDir::new().unwrap();
        let camera = tmp.path().join("camera.jpg");
        fs::write(&camera, b"jpeg").unwrap();
        let camera = camera.to_string_lossy().into_owned();
        let template = tmp.path().join("crop.%s").to_string_lossy().into_owned();

        let mut c = coordinator(MockHost::new(tmp.path()));
        c.launch_camera(&camera, 300, 200, &template).unwrap();
        c.on_result(CAMERA, Outcome::Ok, &ok());

        assert!(events(&c).is_empty());
        let req = crop_request(&c);
        assert_eq!(req.size, CropSize::new(300, 200));
        assert_eq!(req.output_format, "jpg");
        assert!(req.grant_uri_permissions);
        assert!(req.no_face_detection);
        assert_eq!(req.source.authority(), Some("de.example.photos.provider_photoutil"));

        let expected = fill_template(&template, "jpg");
        assert_eq!(req.output, Locator::from_file(&expected).unwrap());

        c.on_result(CROP, Outcome::Ok, &ok());
        assert_eq!(events(&c), &[PhotoEvent::Crop(expected)]);
        assert!(fs::metadata(&camera).is_err());
        assert_eq!(c.flow_state().origin, None);
    }

    #[test]
    fn test_camera_crop_cleanup_tolerates_missing_file() {
        let tmp = TempDir::new().unwrap();
        let camera = tmp.path().join("never-written.jpg").to_string_lossy().into_owned();

        let mut c = coordinator(MockHost::new(tmp.path()));
        c.launch_camera(&camera, 100, 100, "/out/crop.%s").unwrap();
        c.on_result(CAMERA, Outcome::Ok, &ok());
        c.on_result(CROP, Outcome::Ok, &ok());

        assert_eq!(events(&c), &[PhotoEvent::Crop("/out/crop.jpg".to_string())]);
    }

    #[test]
    fn test_camera_crop_cleanup_failure_still_reports_crop() {
        let tmp = TempDir::new().unwrap();
        // A non-empty directory where the camera file should be cannot be removed
        let camera = tmp.path().join("camera.jpg");
        fs::create_dir(&camera).unwrap();
        fs::write(camera.join("keep.txt"), b"x").unwrap();
        let camera_str = camera.to_string_lossy().into_owned();
        let template = tmp.path().join("crop.%s").to_string_lossy().into_owned();

        let mut c = coordinator(MockHost::new(tmp.path()));
        c.launch_camera(&camera_str, 120, 80, &template).unwrap();
        c.on_result(CAMERA, Outcome::Ok, &ok());
        c.on_result(CROP, Outcome::Ok, &ok());

        assert_eq!(events(&c), &[PhotoEvent::Crop(fill_template(&template, "jpg"))]);
        assert!(camera.is_dir());
        assert!(camera.join("keep.txt").is_file());
    }

    #[test]
    fn test_camera_crop_launch_failure_reports_failed() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_camera("/files/camera.jpg", 100, 100, "/files/crop.%s")
            .unwrap();
        c.host_mut().fail_launch = true;
        c.on_result(CAMERA, Outcome::Ok, &ok());

        assert_eq!(events(&c), &[PhotoEvent::Failed]);
        assert!(!c.flow_state().awaiting_crop());
    }

    #[test]
    fn test_default_camera_paths() {
        let mut c = coordinator(MockHost::new("/data/files"));
        c.launch_camera_cropped(64, 64).unwrap();
        assert_eq!(c.flow_config().camera_save_path, "/data/files/camera.jpg");
        assert_eq!(c.flow_config().crop_save_path_template, "/data/files/crop.%s");

        c.launch_camera_default().unwrap();
        assert!(!c.flow_config().needs_crop());
    }

    #[test]
    fn test_gallery_without_crop() {
        let host = MockHost::new("/files").with_row(PICKED, "/sdcard/DCIM/pic.png");
        let mut c = coordinator(host);
        c.launch_gallery_default().unwrap();

        let (request, code) = c.host().last_launch().unwrap().clone();
        assert_eq!(code, GALLERY);
        assert_eq!(request, ProviderRequest::pick_image());

        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        assert_eq!(events(&c), &[PhotoEvent::Gallery("/sdcard/DCIM/pic.png".to_string())]);
    }

    #[test]
    fn test_gallery_with_crop_keeps_camera_file() {
        let tmp = TempDir::new().unwrap();
        let camera = tmp.path().join("camera.jpg");
        fs::write(&camera, b"jpeg").unwrap();
        let camera = camera.to_string_lossy().into_owned();

        let host = MockHost::new(tmp.path()).with_row(PICKED, "/sdcard/DCIM/pic.png");
        let mut c = coordinator(host);

        c.launch_camera_to(&camera).unwrap();
        c.on_result(CAMERA, Outcome::Ok, &ok());

        c.launch_gallery(500, 500, "/out/crop.%s").unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));

        let req = crop_request(&c);
        assert_eq!(req.source.as_str(), PICKED);
        assert_eq!(req.output_format, "png");
        assert!(!req.grant_uri_permissions);

        c.on_result(CROP, Outcome::Ok, &ok());
        assert_eq!(
            events(&c),
            &[
                PhotoEvent::Camera(camera.clone()),
                PhotoEvent::Crop("/out/crop.png".to_string())
            ]
        );
        assert!(fs::metadata(&camera).is_ok());
    }

    #[test]
    fn test_gallery_default_crop_template() {
        let host = MockHost::new("/data/files").with_row(PICKED, "/sdcard/a.webp");
        let mut c = coordinator(host);
        c.launch_gallery_cropped(10, 20).unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        c.on_result(CROP, Outcome::Ok, &ok());
        assert_eq!(events(&c), &[PhotoEvent::Crop("/data/files/crop.webp".to_string())]);
    }

    #[test]
    fn test_gallery_without_payload_fails() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_gallery(100, 100, "/out/crop.%s").unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::empty());

        assert_eq!(events(&c), &[PhotoEvent::Failed]);
        assert_eq!(c.host().launched.len(), 1);
    }

    #[test]
    fn test_gallery_unresolvable_locator_fails() {
        // No rows registered, so the metadata query fails
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_gallery_default().unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        assert_eq!(events(&c), &[PhotoEvent::Failed]);

        let mut c = coordinator(MockHost::new("/files"));
        c.launch_gallery_default().unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(""));
        assert_eq!(events(&c), &[PhotoEvent::Failed]);
    }

    #[test]
    fn test_gallery_document_locator() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_gallery_default().unwrap();
        c.on_result(
            GALLERY,
            Outcome::Ok,
            &ResultPayload::with_data(
                "content://com.android.externalstorage.documents/document/primary%3ADCIM%2Ffoo.jpg",
            ),
        );
        assert_eq!(
            events(&c),
            &[PhotoEvent::Gallery("/storage/emulated/0/DCIM/foo.jpg".to_string())]
        );
        assert!(c.host().queries.borrow().is_empty());
    }

    #[test]
    fn test_gallery_crop_without_extension_fails() {
        let host = MockHost::new("/files").with_row(PICKED, "/sdcard/DCIM/noext");
        let mut c = coordinator(host);
        c.launch_gallery(100, 100, "/out/crop.%s").unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));

        assert_eq!(events(&c), &[PhotoEvent::Failed]);
        assert_eq!(c.host().launched.len(), 1);
    }

    #[test]
    fn test_cancel_reports_once_regardless_of_crop() {
        for (w, h) in [(0, 0), (200, 200)] {
            let mut c = coordinator(MockHost::new("/files"));
            c.launch_camera("/files/camera.jpg", w, h, "/files/crop.%s")
                .unwrap();
            c.on_result(CAMERA, Outcome::Cancelled, &ok());
            assert_eq!(events(&c), &[PhotoEvent::Cancel]);
            assert_eq!(c.host().launched.len(), 1);

            let mut c = coordinator(MockHost::new("/files"));
            c.launch_gallery(w, h, "/files/crop.%s").unwrap();
            c.on_result(GALLERY, Outcome::Cancelled, &ok());
            assert_eq!(events(&c), &[PhotoEvent::Cancel]);
            assert_eq!(c.host().launched.len(), 1);
        }
    }

    #[test]
    fn test_cancelled_crop() {
        let host = MockHost::new("/files").with_row(PICKED, "/sdcard/a.jpg");
        let mut c = coordinator(host);
        c.launch_gallery(50, 50, "/out/crop.%s").unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        c.on_result(CROP, Outcome::Cancelled, &ok());
        assert_eq!(events(&c), &[PhotoEvent::Cancel]);
    }

    #[test]
    fn test_failed_outcome() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_gallery_default().unwrap();
        c.on_result(GALLERY, Outcome::Failed(42), &ok());
        assert_eq!(events(&c), &[PhotoEvent::Failed]);
    }

    #[test]
    fn test_first_user_outcome_is_only_logged() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_camera_default().unwrap();
        c.on_result(CAMERA, Outcome::from_code(1), &ok());
        assert!(events(&c).is_empty());
    }

    #[test]
    fn test_unknown_request_code_is_ignored() {
        let mut c = coordinator(MockHost::new("/files"));
        c.launch_camera_default().unwrap();
        for outcome in [Outcome::Ok, Outcome::Cancelled, Outcome::Failed(3)] {
            c.on_result(999, outcome, &ResultPayload::with_data(PICKED));
        }
        assert!(events(&c).is_empty());
        assert_eq!(c.host().launched.len(), 1);
    }

    #[test]
    fn test_crop_result_without_pending_crop_is_ignored() {
        let mut c = coordinator(MockHost::new("/files"));
        c.on_result(CROP, Outcome::Ok, &ok());
        assert!(events(&c).is_empty());
    }

    #[test]
    fn test_launch_crop_requires_origin() {
        let mut c = coordinator(MockHost::new("/files"));
        let result = c.launch_crop(false, Locator::from_file("/a.jpg").unwrap(), "jpg");
        assert!(matches!(result, Err(CaptureError::InvalidState(_))));
        assert!(c.host().launched.is_empty());
    }

    #[test]
    fn test_new_launch_replaces_pending_flow() {
        let host = MockHost::new("/files").with_row(PICKED, "/sdcard/a.jpg");
        let mut c = coordinator(host);
        c.launch_gallery(50, 50, "/out/crop.%s").unwrap();
        let first = c.flow_state().flow_id;
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        assert!(c.flow_state().awaiting_crop());

        c.launch_camera_default().unwrap();
        assert!(!c.flow_state().awaiting_crop());
        assert_ne!(c.flow_state().flow_id, first);
    }

    #[test]
    fn test_camera_launch_failure_propagates() {
        let mut host = MockHost::new("/files");
        host.fail_launch = true;
        let mut c = coordinator(host);
        assert!(matches!(
            c.launch_camera_default(),
            Err(CaptureError::Host(_))
        ));
        assert!(c.launch_gallery_default().is_err());
    }

    #[test]
    fn test_crop_request_action() {
        let host = MockHost::new("/files").with_row(PICKED, "/sdcard/a.jpg");
        let mut c = coordinator(host);
        c.launch_gallery(50, 50, "/out/crop.%s").unwrap();
        c.on_result(GALLERY, Outcome::Ok, &ResultPayload::with_data(PICKED));
        let (request, _) = c.host().last_launch().unwrap();
        assert_eq!(request.action(), ACTION_CROP);
    }
}
