//! `CoreAudio` backend
//!
//! Thin shim over the macOS HAL: property get/set on the system audio object,
//! device name lookup, the master-volume capability probe, and property
//! listener registration for topology notifications.

use std::ffi::c_void;
use std::mem;
use std::ptr;

use color_eyre::eyre::{Result, eyre};
use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};
use coreaudio_sys::{
    AudioDeviceID, AudioObjectAddPropertyListener, AudioObjectGetPropertyData,
    AudioObjectGetPropertyDataSize, AudioObjectHasProperty, AudioObjectID,
    AudioObjectPropertyAddress, AudioObjectSetPropertyData, OSStatus,
    kAudioDevicePropertyScopeOutput, kAudioDevicePropertyVolumeScalar,
    kAudioHardwarePropertyDefaultOutputDevice, kAudioHardwarePropertyDefaultSystemOutputDevice,
    kAudioHardwarePropertyDevices, kAudioObjectPropertyElementMaster, kAudioObjectPropertyName,
    kAudioObjectPropertyScopeGlobal, kAudioObjectSystemObject,
};
use tokio::sync::mpsc;
use tracing::trace;

use super::{AudioHost, DeviceId, OutputDevice};
use crate::error::HostQueryError;
use crate::monitor::Trigger;

/// `kAudioHardwareServiceDeviceProperty_VirtualMainVolume` ('vmvc') from
/// `AudioHardwareService.h`; not covered by the generated bindings.
const VIRTUAL_MAIN_VOLUME: u32 = u32::from_be_bytes(*b"vmvc");

const SYSTEM_OBJECT: AudioObjectID = kAudioObjectSystemObject;

fn global_address(selector: u32) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: kAudioObjectPropertyScopeGlobal,
        mElement: kAudioObjectPropertyElementMaster,
    }
}

fn check(status: OSStatus) -> Result<(), HostQueryError> {
    if status == 0 {
        Ok(())
    } else {
        Err(HostQueryError::Status(status))
    }
}

fn all_device_ids() -> Result<Vec<AudioDeviceID>, HostQueryError> {
    let address = global_address(kAudioHardwarePropertyDevices);
    let mut data_size: u32 = 0;
    check(unsafe {
        AudioObjectGetPropertyDataSize(
            SYSTEM_OBJECT,
            &address,
            0,
            ptr::null(),
            &raw mut data_size,
        )
    })?;

    let count = data_size as usize / mem::size_of::<AudioDeviceID>();
    let mut ids: Vec<AudioDeviceID> = vec![0; count];
    check(unsafe {
        AudioObjectGetPropertyData(
            SYSTEM_OBJECT,
            &address,
            0,
            ptr::null(),
            &raw mut data_size,
            ids.as_mut_ptr().cast::<c_void>(),
        )
    })?;
    ids.truncate(data_size as usize / mem::size_of::<AudioDeviceID>());
    Ok(ids)
}

fn device_name(id: AudioDeviceID) -> Option<String> {
    let address = global_address(kAudioObjectPropertyName);
    let mut cf: CFStringRef = ptr::null();
    let mut data_size = mem::size_of::<CFStringRef>() as u32;
    let status = unsafe {
        AudioObjectGetPropertyData(
            id,
            &address,
            0,
            ptr::null(),
            &raw mut data_size,
            (&raw mut cf).cast::<c_void>(),
        )
    };
    if status != 0 || cf.is_null() {
        return None;
    }
    // The get returns a +1 reference.
    let name = unsafe { CFString::wrap_under_create_rule(cf) };
    Some(name.to_string())
}

fn get_default(selector: u32) -> Result<DeviceId, HostQueryError> {
    let address = global_address(selector);
    let mut id: AudioDeviceID = 0;
    let mut data_size = mem::size_of::<AudioDeviceID>() as u32;
    check(unsafe {
        AudioObjectGetPropertyData(
            SYSTEM_OBJECT,
            &address,
            0,
            ptr::null(),
            &raw mut data_size,
            (&raw mut id).cast::<c_void>(),
        )
    })?;
    Ok(DeviceId(id))
}

fn set_default(selector: u32, device: DeviceId) -> Result<(), HostQueryError> {
    let address = global_address(selector);
    let id: AudioDeviceID = device.0;
    check(unsafe {
        AudioObjectSetPropertyData(
            SYSTEM_OBJECT,
            &address,
            0,
            ptr::null(),
            mem::size_of::<AudioDeviceID>() as u32,
            (&raw const id).cast::<c_void>(),
        )
    })
}

fn has_property(id: AudioDeviceID, selector: u32, scope: u32) -> bool {
    let address = AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: scope,
        mElement: kAudioObjectPropertyElementMaster,
    };
    unsafe { AudioObjectHasProperty(id, &address) != 0 }
}

/// The real host backed by the `CoreAudio` HAL
#[derive(Debug, Default)]
pub struct CoreAudioHost;

impl AudioHost for CoreAudioHost {
    fn list_output_devices(&self) -> Vec<OutputDevice> {
        let Ok(ids) = all_device_ids() else {
            return Vec::new();
        };
        let devices: Vec<OutputDevice> = ids
            .into_iter()
            .filter_map(|id| {
                device_name(id).map(|name| OutputDevice {
                    id: DeviceId(id),
                    name,
                })
            })
            .collect();
        trace!("enumerated {} devices", devices.len());
        devices
    }

    fn default_output(&self) -> Result<DeviceId, HostQueryError> {
        get_default(kAudioHardwarePropertyDefaultOutputDevice)
    }

    fn default_system_output(&self) -> Result<DeviceId, HostQueryError> {
        get_default(kAudioHardwarePropertyDefaultSystemOutputDevice)
    }

    fn set_default_output(&self, device: DeviceId) -> Result<(), HostQueryError> {
        set_default(kAudioHardwarePropertyDefaultOutputDevice, device)
    }

    fn set_default_system_output(&self, device: DeviceId) -> Result<(), HostQueryError> {
        set_default(kAudioHardwarePropertyDefaultSystemOutputDevice, device)
    }

    fn supports_main_volume(&self, device: DeviceId) -> bool {
        super::probe_main_volume(
            || has_property(device.0, VIRTUAL_MAIN_VOLUME, kAudioObjectPropertyScopeGlobal),
            || {
                has_property(
                    device.0,
                    kAudioDevicePropertyVolumeScalar,
                    kAudioDevicePropertyScopeOutput,
                )
            },
        )
    }
}

/// Client data for one listener registration
struct ListenerCtx {
    tx: mpsc::UnboundedSender<Trigger>,
    trigger: Trigger,
}

unsafe extern "C" fn listener_proc(
    _object: AudioObjectID,
    _num_addresses: u32,
    _addresses: *const AudioObjectPropertyAddress,
    client_data: *mut c_void,
) -> OSStatus {
    // Fires on a HAL-owned thread; the send hands off to the daemon's single
    // reconciliation context.
    let ctx = unsafe { &*client_data.cast::<ListenerCtx>() };
    let _ = ctx.tx.send(ctx.trigger);
    0
}

/// Register property listeners on the system object for the three topology
/// channels. Registrations live for the daemon lifetime; the leaked client
/// data is intentional.
pub fn install_topology_listeners(tx: mpsc::UnboundedSender<Trigger>) -> Result<()> {
    let channels = [
        (
            kAudioHardwarePropertyDefaultOutputDevice,
            Trigger::DefaultOutputChanged,
        ),
        (kAudioHardwarePropertyDevices, Trigger::DeviceListChanged),
        (
            kAudioHardwarePropertyDefaultSystemOutputDevice,
            Trigger::DefaultSystemOutputChanged,
        ),
    ];

    for (selector, trigger) in channels {
        let address = global_address(selector);
        let ctx = Box::into_raw(Box::new(ListenerCtx {
            tx: tx.clone(),
            trigger,
        }));
        let status = unsafe {
            AudioObjectAddPropertyListener(
                SYSTEM_OBJECT,
                &address,
                Some(listener_proc),
                ctx.cast::<c_void>(),
            )
        };
        if status != 0 {
            return Err(eyre!(
                "failed to register listener for {}: status {status}",
                trigger.describe()
            ));
        }
    }

    Ok(())
}
