// JNI plumbing shared by the camera and location calls.
//
// The host activity reports results through static getters, so every call
// follows the same shape: attach, resolve the activity, clear the last error,
// invoke a launcher method and poll a getter until it returns non-null.

use crate::{AndroidBridgeConfig, BridgeError};
use jni::objects::{JClass, JObject, JString, JValue};
use jni::{JNIEnv, JavaVM};
use ndk_context::android_context;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn jni_err(what: &str) -> impl Fn(jni::errors::Error) -> BridgeError + '_ {
    move |e| BridgeError::Other(format!("{} failed: {}", what, e))
}

/// Attach the current thread to the VM and run `f` with its environment
pub(crate) fn with_env<R>(
    f: impl FnOnce(&mut JNIEnv<'_>) -> Result<R, BridgeError>,
) -> Result<R, BridgeError> {
    let vm_ptr = android_context().vm() as *mut *const jni::sys::JNIInvokeInterface_;
    let vm = unsafe { JavaVM::from_raw(vm_ptr) }.map_err(jni_err("JavaVM"))?;
    let mut env = vm.attach_current_thread().map_err(jni_err("JNI attach"))?;
    f(&mut env)
}

fn get_app_class_loader<'a>(env: &mut JNIEnv<'a>) -> Result<JObject<'a>, BridgeError> {
    let at_cls = env
        .find_class("android/app/ActivityThread")
        .map_err(jni_err("find ActivityThread"))?;
    let at = env
        .call_static_method(
            &at_cls,
            "currentActivityThread",
            "()Landroid/app/ActivityThread;",
            &[],
        )
        .and_then(|v| v.l())
        .map_err(jni_err("currentActivityThread"))?;

    let app = env
        .call_method(&at, "getApplication", "()Landroid/app/Application;", &[])
        .and_then(|v| v.l())
        .map_err(jni_err("getApplication"))?;

    // Before the application object exists only the system context is available
    let owner = if app.is_null() {
        env.call_method(&at, "getSystemContext", "()Landroid/app/ContextImpl;", &[])
            .and_then(|v| v.l())
            .map_err(jni_err("getSystemContext"))?
    } else {
        app
    };

    env.call_method(&owner, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(jni_err("getClassLoader"))
}

fn load_class<'a>(
    env: &mut JNIEnv<'a>,
    loader: &JObject<'a>,
    fq_slash: &str,
) -> Result<JClass<'a>, BridgeError> {
    // ClassLoader.loadClass expects dotted names
    let name: JString = env
        .new_string(fq_slash.replace('/', "."))
        .map_err(jni_err("new_string"))?;
    let cls_obj = env
        .call_method(
            loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[JValue::Object(&JObject::from(name))],
        )
        .and_then(|v| v.l())
        .map_err(jni_err("ClassLoader.loadClass"))?;
    Ok(JClass::from(cls_obj))
}

fn companion_instance<'a>(
    env: &mut JNIEnv<'a>,
    cls: &JClass<'a>,
    config: &AndroidBridgeConfig,
    signature: &str,
) -> Result<JObject<'a>, BridgeError> {
    let comp_signature = format!("L{}$Companion;", config.main_activity_class);
    let comp_obj = env
        .get_static_field(cls, "Companion", &comp_signature)
        .and_then(|v| v.l())
        .map_err(jni_err("Companion field"))?;
    if comp_obj.is_null() {
        return Err(BridgeError::Other(
            "MainActivity.Companion is null, activity not initialized?".to_string(),
        ));
    }
    env.call_method(&comp_obj, "getInstance", signature, &[])
        .and_then(|v| v.l())
        .map_err(jni_err("Companion.getInstance()"))
}

/// Resolve the running activity instance and its class
pub(crate) fn get_activity_instance<'a>(
    env: &mut JNIEnv<'a>,
    config: &AndroidBridgeConfig,
) -> Result<(JObject<'a>, JClass<'a>), BridgeError> {
    let loader = get_app_class_loader(env)?;
    let cls = load_class(env, &loader, &config.main_activity_class)?;
    let signature = format!("()L{};", config.main_activity_class);

    // Preferred: static helper generated by `@JvmStatic`
    let instance = match env
        .call_static_method(&cls, "getInstance", &signature, &[])
        .and_then(|v| v.l())
    {
        Ok(inst) => inst,
        Err(_) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
            match env
                .get_static_field(&cls, "instance", &signature)
                .and_then(|v| v.l())
            {
                Ok(inst) if !inst.is_null() => inst,
                _ => {
                    if env.exception_check().unwrap_or(false) {
                        let _ = env.exception_clear();
                    }
                    companion_instance(env, &cls, config, &signature)?
                }
            }
        }
    };

    if instance.is_null() {
        return Err(BridgeError::Other(
            "MainActivity instance is null, activity not initialized?".to_string(),
        ));
    }

    Ok((instance, cls))
}

pub(crate) fn clear_last_error(env: &mut JNIEnv<'_>, cls: &JClass<'_>) -> Result<(), BridgeError> {
    env.call_static_method(cls, "clearLastError", "()V", &[])
        .map(|_| ())
        .map_err(jni_err("clearLastError"))
}

fn read_static_string(
    env: &mut JNIEnv<'_>,
    cls: &JClass<'_>,
    getter: &str,
) -> Result<Option<String>, BridgeError> {
    let Ok(result) = env.call_static_method(cls, getter, "()Ljava/lang/String;", &[]) else {
        return Ok(None);
    };
    let Ok(obj) = result.l() else {
        return Ok(None);
    };
    if obj.is_null() {
        return Ok(None);
    }
    let value: String = env
        .get_string((&obj).into())
        .map_err(jni_err("String conversion"))?
        .into();
    Ok(Some(value))
}

/// Poll `getter` until it yields a value, the host reports an error, or `timeout` passes
pub(crate) fn poll_result(
    env: &mut JNIEnv<'_>,
    cls: &JClass<'_>,
    getter: &str,
    timeout: Duration,
    what: &str,
) -> Result<String, BridgeError> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        std::thread::sleep(POLL_INTERVAL);

        if let Some(value) = read_static_string(env, cls, getter)? {
            return Ok(value);
        }
        if let Some(err) = read_static_string(env, cls, "getLastError")? {
            return Err(BridgeError::from_host_message(err));
        }
    }

    log::warn!("{} gave no result within {:?}", what, timeout);
    Err(BridgeError::Timeout(format!("{} - no result", what)))
}
