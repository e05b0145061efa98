// Android host implementation
//
// Talks to the current activity over JNI: builds intents, starts them for a
// result, queries the content resolver and exposes files through the app's
// FileProvider. The activity's onActivityResult hook is expected to forward
// its arguments to `CaptureCoordinator::on_result`, using
// `payload_from_intent` for the returned intent.

use crate::error::CaptureError;
use crate::host::{CaptureHost, ContentQuery, MetadataQuery, MetadataRow, PlatformInfo};
use crate::locator::Locator;
use crate::models::{RequestCode, ResultPayload};
use crate::request::{CropRequest, ProviderRequest};
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use ndk_context::android_context;
use std::path::PathBuf;

const EXTRA_OUTPUT: &str = "output";
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;
const FLAG_GRANT_WRITE_URI_PERMISSION: i32 = 0x0000_0002;
const MEDIA_MOUNTED: &str = "mounted";
const FILE_PROVIDER_CLASS: &str = "androidx.core.content.FileProvider";

const SIG_PUT_STRING: &str = "(Ljava/lang/String;Ljava/lang/String;)Landroid/content/Intent;";
const SIG_PUT_INT: &str = "(Ljava/lang/String;I)Landroid/content/Intent;";
const SIG_PUT_BOOL: &str = "(Ljava/lang/String;Z)Landroid/content/Intent;";
const SIG_PUT_PARCELABLE: &str =
    "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;";

fn jni_error(context: &str, e: jni::errors::Error) -> CaptureError {
    CaptureError::Host(format!("{} failed: {}", context, e))
}

pub struct AndroidHost {
    vm: JavaVM,
    activity: GlobalRef,
}

impl AndroidHost {
    /// Host bound to the activity published through `ndk_context`
    pub fn from_context() -> Result<Self, CaptureError> {
        let ctx = android_context();
        let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
            .map_err(|e| jni_error("JavaVM", e))?;
        let activity = {
            let env = vm
                .attach_current_thread()
                .map_err(|e| jni_error("JNI attach", e))?;
            let activity = unsafe { JObject::from_raw(ctx.context().cast()) };
            env.new_global_ref(activity)
                .map_err(|e| jni_error("new_global_ref", e))?
        };
        Ok(Self { vm, activity })
    }

    /// Attaches to the VM and runs `f`, clearing any pending Java exception on failure
    fn with_env<T>(
        &self,
        context: &str,
        f: impl FnOnce(&mut JNIEnv, &JObject) -> jni::errors::Result<T>,
    ) -> Result<T, CaptureError> {
        let mut env = self
            .vm
            .attach_current_thread()
            .map_err(|e| jni_error("JNI attach", e))?;
        let result = f(&mut *env, self.activity.as_obj());
        if result.is_err() && env.exception_check().unwrap_or(false) {
            let _ = env.exception_describe();
            let _ = env.exception_clear();
        }
        result.map_err(|e| jni_error(context, e))
    }

    fn query_rows(&self, query: &MetadataQuery) -> Result<Vec<MetadataRow>, CaptureError> {
        self.with_env("ContentResolver.query", |env, activity| {
            let resolver = env
                .call_method(
                    activity,
                    "getContentResolver",
                    "()Landroid/content/ContentResolver;",
                    &[],
                )?
                .l()?;
            let uri = parse_uri(env, query.locator.as_str())?;
            let projection = string_array(env, &query.projection)?;
            let selection = match &query.selection {
                Some(s) => JObject::from(env.new_string(s)?),
                None => JObject::null(),
            };
            let selection_args = if query.selection_args.is_empty() {
                JObject::null()
            } else {
                string_array(env, &query.selection_args)?
            };

            let cursor = env
                .call_method(
                    &resolver,
                    "query",
                    "(Landroid/net/Uri;[Ljava/lang/String;Ljava/lang/String;[Ljava/lang/String;Ljava/lang/String;)Landroid/database/Cursor;",
                    &[
                        JValue::Object(&uri),
                        JValue::Object(&projection),
                        JValue::Object(&selection),
                        JValue::Object(&selection_args),
                        JValue::Object(&JObject::null()),
                    ],
                )?
                .l()?;
            if cursor.is_null() {
                return Ok(Vec::new());
            }

            let mut indices = Vec::with_capacity(query.projection.len());
            for column in &query.projection {
                let name = env.new_string(column)?;
                let index = env
                    .call_method(
                        &cursor,
                        "getColumnIndexOrThrow",
                        "(Ljava/lang/String;)I",
                        &[JValue::Object(&name)],
                    )?
                    .i()?;
                indices.push(index);
            }

            let mut rows = Vec::new();
            while env.call_method(&cursor, "moveToNext", "()Z", &[])?.z()? {
                let mut row = Vec::with_capacity(indices.len());
                for index in &indices {
                    let value = env
                        .call_method(
                            &cursor,
                            "getString",
                            "(I)Ljava/lang/String;",
                            &[JValue::Int(*index)],
                        )?
                        .l()?;
                    row.push(optional_string(env, value)?);
                }
                rows.push(row);
            }
            env.call_method(&cursor, "close", "()V", &[])?;
            Ok(rows)
        })
    }

    fn storage_dir(&self, external_root: bool) -> Result<PathBuf, CaptureError> {
        self.with_env("storage directory", |env, activity| {
            let mounted = external_storage_available(env)?;
            let dir = if mounted && external_root {
                env.call_static_method(
                    "android/os/Environment",
                    "getExternalStorageDirectory",
                    "()Ljava/io/File;",
                    &[],
                )?
                .l()?
            } else if mounted {
                env.call_method(
                    activity,
                    "getExternalFilesDir",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&JObject::null())],
                )?
                .l()?
            } else {
                JObject::null()
            };
            let dir = if dir.is_null() {
                env.call_method(activity, "getFilesDir", "()Ljava/io/File;", &[])?
                    .l()?
            } else {
                dir
            };
            let path = env
                .call_method(&dir, "getAbsolutePath", "()Ljava/lang/String;", &[])?
                .l()?;
            let path: String = env.get_string(&JString::from(path))?.into();
            Ok(PathBuf::from(path))
        })
    }
}

impl ContentQuery for AndroidHost {
    fn query_metadata(&self, query: &MetadataQuery) -> Result<Vec<MetadataRow>, CaptureError> {
        self.query_rows(query)
            .map_err(|e| CaptureError::Query(e.to_string()))
    }
}

impl CaptureHost for AndroidHost {
    fn launch_external(
        &mut self,
        request: &ProviderRequest,
        code: RequestCode,
    ) -> Result<(), CaptureError> {
        log::debug!("Launching {} for request code {}", request.action(), code);
        self.with_env("startActivityForResult", |env, activity| {
            let action = env.new_string(request.action())?;
            let intent = env.new_object(
                "android/content/Intent",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&action)],
            )?;

            match request {
                ProviderRequest::Capture { output } => {
                    let uri = parse_uri(env, output.as_str())?;
                    put_parcelable(env, &intent, EXTRA_OUTPUT, &uri)?;
                }
                ProviderRequest::Pick { mime_type } => {
                    let mime = env.new_string(mime_type)?;
                    env.call_method(
                        &intent,
                        "setType",
                        "(Ljava/lang/String;)Landroid/content/Intent;",
                        &[JValue::Object(&mime)],
                    )?;
                }
                ProviderRequest::Crop(crop) => fill_crop_intent(env, &intent, crop)?,
            }

            env.call_method(
                activity,
                "startActivityForResult",
                "(Landroid/content/Intent;I)V",
                &[JValue::Object(&intent), JValue::Int(code)],
            )?;
            Ok(())
        })
    }

    fn obtain_shared_locator(&self, path: &str, authority: &str) -> Result<Locator, CaptureError> {
        let uri = self.with_env("FileProvider.getUriForFile", |env, activity| {
            let provider = load_app_class(env, activity, FILE_PROVIDER_CLASS)?;
            let path = env.new_string(path)?;
            let file = env.new_object("java/io/File", "(Ljava/lang/String;)V", &[JValue::Object(&path)])?;
            let authority = env.new_string(authority)?;
            let uri = env
                .call_static_method(
                    &provider,
                    "getUriForFile",
                    "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                    &[
                        JValue::Object(activity),
                        JValue::Object(&authority),
                        JValue::Object(&file),
                    ],
                )?
                .l()?;
            uri_to_string(env, &uri)
        })?;
        Locator::parse(&uri)
    }

    fn platform(&self) -> PlatformInfo {
        let api_level = self
            .with_env("Build.VERSION.SDK_INT", |env, _| {
                env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")?
                    .i()
            })
            .unwrap_or_else(|e| {
                log::error!("{}", e);
                0
            });
        PlatformInfo::new(api_level.max(0) as u32)
    }

    fn package_name(&self) -> String {
        self.with_env("getPackageName", |env, activity| {
            let name = env
                .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])?
                .l()?;
            Ok(env.get_string(&JString::from(name))?.into())
        })
        .unwrap_or_else(|e| {
            log::error!("{}", e);
            String::new()
        })
    }

    fn files_dir(&self) -> PathBuf {
        self.storage_dir(false).unwrap_or_else(|e| {
            log::error!("{}", e);
            PathBuf::from("./data")
        })
    }

    fn external_storage_dir(&self) -> PathBuf {
        self.storage_dir(true).unwrap_or_else(|e| {
            log::error!("{}", e);
            PathBuf::from("./data")
        })
    }
}

/// Reads the data locator of an intent returned to onActivityResult
pub fn payload_from_intent(env: &mut JNIEnv, intent: &JObject) -> ResultPayload {
    if intent.is_null() {
        return ResultPayload::empty();
    }
    let data = env
        .call_method(intent, "getData", "()Landroid/net/Uri;", &[])
        .and_then(|v| v.l())
        .and_then(|uri| {
            if uri.is_null() {
                Ok(None)
            } else {
                uri_to_string(env, &uri).map(Some)
            }
        });
    match data {
        Ok(data) => ResultPayload { data },
        Err(e) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
            log::error!("Could not read intent data: {}", e);
            ResultPayload::empty()
        }
    }
}

fn fill_crop_intent(env: &mut JNIEnv, intent: &JObject, crop: &CropRequest) -> jni::errors::Result<()> {
    let source = parse_uri(env, crop.source.as_str())?;
    let mime = env.new_string(&crop.mime_type)?;
    env.call_method(
        intent,
        "setDataAndType",
        "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
        &[JValue::Object(&source), JValue::Object(&mime)],
    )?;

    put_string(env, intent, "crop", "true")?;
    put_string(env, intent, "scale", if crop.scale { "true" } else { "false" })?;
    put_int(env, intent, "aspectX", crop.size.width as i32)?;
    put_int(env, intent, "aspectY", crop.size.height as i32)?;
    put_int(env, intent, "outputX", crop.size.width as i32)?;
    put_int(env, intent, "outputY", crop.size.height as i32)?;
    put_string(env, intent, "outputFormat", &crop.output_format)?;
    put_bool(env, intent, "return-data", crop.return_data)?;

    let output = parse_uri(env, crop.output.as_str())?;
    put_parcelable(env, intent, EXTRA_OUTPUT, &output)?;
    put_bool(env, intent, "noFaceDetection", crop.no_face_detection)?;

    if crop.grant_uri_permissions {
        env.call_method(
            intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(
                FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION,
            )],
        )?;
    }
    Ok(())
}

fn put_string(env: &mut JNIEnv, intent: &JObject, key: &str, value: &str) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    let value = env.new_string(value)?;
    env.call_method(
        intent,
        "putExtra",
        SIG_PUT_STRING,
        &[JValue::Object(&key), JValue::Object(&value)],
    )?;
    Ok(())
}

fn put_int(env: &mut JNIEnv, intent: &JObject, key: &str, value: i32) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    env.call_method(intent, "putExtra", SIG_PUT_INT, &[JValue::Object(&key), JValue::Int(value)])?;
    Ok(())
}

fn put_bool(env: &mut JNIEnv, intent: &JObject, key: &str, value: bool) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    env.call_method(
        intent,
        "putExtra",
        SIG_PUT_BOOL,
        &[JValue::Object(&key), JValue::Bool(value.into())],
    )?;
    Ok(())
}

fn put_parcelable(
    env: &mut JNIEnv,
    intent: &JObject,
    key: &str,
    value: &JObject,
) -> jni::errors::Result<()> {
    let key = env.new_string(key)?;
    env.call_method(
        intent,
        "putExtra",
        SIG_PUT_PARCELABLE,
        &[JValue::Object(&key), JValue::Object(value)],
    )?;
    Ok(())
}

fn parse_uri<'a>(env: &mut JNIEnv<'a>, locator: &str) -> jni::errors::Result<JObject<'a>> {
    let s = env.new_string(locator)?;
    env.call_static_method(
        "android/net/Uri",
        "parse",
        "(Ljava/lang/String;)Landroid/net/Uri;",
        &[JValue::Object(&s)],
    )?
    .l()
}

fn uri_to_string(env: &mut JNIEnv, uri: &JObject) -> jni::errors::Result<String> {
    let s = env
        .call_method(uri, "toString", "()Ljava/lang/String;", &[])?
        .l()?;
    Ok(env.get_string(&JString::from(s))?.into())
}

fn string_array<'a>(env: &mut JNIEnv<'a>, values: &[String]) -> jni::errors::Result<JObject<'a>> {
    let array = env.new_object_array(values.len() as i32, "java/lang/String", JObject::null())?;
    for (i, value) in values.iter().enumerate() {
        let s = env.new_string(value)?;
        env.set_object_array_element(&array, i as i32, s)?;
    }
    Ok(JObject::from(array))
}

fn optional_string(env: &mut JNIEnv, value: JObject) -> jni::errors::Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    Ok(Some(env.get_string(&JString::from(value))?.into()))
}

fn external_storage_available(env: &mut JNIEnv) -> jni::errors::Result<bool> {
    let state = env
        .call_static_method(
            "android/os/Environment",
            "getExternalStorageState",
            "()Ljava/lang/String;",
            &[],
        )?
        .l()?;
    let state: String = env.get_string(&JString::from(state))?.into();
    if state == MEDIA_MOUNTED {
        return Ok(true);
    }
    let removable = env
        .call_static_method(
            "android/os/Environment",
            "isExternalStorageRemovable",
            "()Z",
            &[],
        )?
        .z()?;
    Ok(!removable)
}

/// Loads an app class through the activity's class loader
///
/// `FindClass` only sees system classes on threads attached from native code.
fn load_app_class<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject,
    fq_dot: &str,
) -> jni::errors::Result<JClass<'a>> {
    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])?
        .l()?;
    let name = env.new_string(fq_dot)?;
    let class = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&name)],
        )?
        .l()?;
    Ok(JClass::from(class))
}
