use super::Backend;
use crate::{Error, Permissions, Process, Region, Result};
use log::{debug, warn};
use mach2::kern_return::{KERN_INVALID_ADDRESS, KERN_SUCCESS};
use mach2::mach_port::mach_port_deallocate;
use mach2::message::mach_msg_type_number_t;
use mach2::port::{mach_port_name_t, mach_port_t, MACH_PORT_NULL};
use mach2::traps::{mach_task_self, task_for_pid};
use mach2::vm::mach_vm_region;
use mach2::vm_prot::*;
use mach2::vm_region::{vm_region_basic_info_64, vm_region_info_t, VM_REGION_BASIC_INFO_64};
use mach2::vm_types::{mach_vm_address_t, mach_vm_size_t};
use std::{io, mem};

/// Walks the address space of a task with `mach_vm_region`.
///
/// The kernel only reports protection and sharing. Every region has an empty
/// pathname, a `00:00` device and a zero inode; this information is not
/// available from the region walk and is not derived from anywhere else.
#[derive(Copy, Clone, Debug, Default)]
pub struct MachBackend;

impl Backend for MachBackend {
  type Regions = MachRegions;

  fn name(&self) -> &'static str {
    "mach"
  }

  fn enumerate(&self, process: Process) -> Result<MachRegions> {
    let task = match process {
      Process::Id(pid) if pid != std::process::id() => Task::for_pid(pid)?,
      _ => Task::current(),
    };

    debug!("walking regions of task {} ({})", task.port, process);
    Ok(MachRegions {
      task: Some(task),
      address: 0,
    })
  }
}

/// A task port, released on drop unless it is the caller's own.
struct Task {
  port: mach_port_name_t,
  owned: bool,
}

impl Task {
  fn current() -> Self {
    Task {
      port: unsafe { mach_task_self() },
      owned: false,
    }
  }

  /// Obtains the task port of another process (requires the
  /// `task_for_pid-allow` entitlement or root).
  fn for_pid(pid: u32) -> Result<Self> {
    if pid > libc::pid_t::max_value() as u32 {
      return Err(Error::ProcessNotFound(pid));
    }

    let mut port: mach_port_name_t = MACH_PORT_NULL;
    let result = unsafe { task_for_pid(mach_task_self(), pid as libc::c_int, &mut port) };

    if result == KERN_SUCCESS {
      return Ok(Task { port, owned: true });
    }

    // `task_for_pid` does not tell a missing process apart from a denied one
    if unsafe { libc::kill(pid as libc::pid_t, 0) } != 0
      && io::Error::last_os_error().raw_os_error() == Some(libc::ESRCH)
    {
      return Err(Error::ProcessNotFound(pid));
    }

    Err(Error::permission_denied(pid, None))
  }
}

impl Drop for Task {
  fn drop(&mut self) {
    if self.owned {
      let result = unsafe { mach_port_deallocate(mach_task_self(), self.port) };
      debug_assert_eq!(result, KERN_SUCCESS, "releasing task port");
    }
  }
}

/// An iterator over the regions of a task, in ascending address order.
pub struct MachRegions {
  task: Option<Task>,
  address: mach_vm_address_t,
}

impl Iterator for MachRegions {
  type Item = Result<Region>;

  fn next(&mut self) -> Option<Self::Item> {
    let task = self.task.as_ref()?;

    let mut address = self.address;
    let mut size: mach_vm_size_t = 0;
    let mut info: vm_region_basic_info_64 = unsafe { mem::zeroed() };
    let mut count = basic_info_count();
    let mut object_name: mach_port_t = MACH_PORT_NULL;

    // The kernel returns the first region at or after the queried address
    let result = unsafe {
      mach_vm_region(
        task.port,
        &mut address,
        &mut size,
        VM_REGION_BASIC_INFO_64,
        (&mut info as *mut vm_region_basic_info_64) as vm_region_info_t,
        &mut count,
        &mut object_name,
      )
    };

    match result {
      // The end of the process' address space has been reached
      KERN_INVALID_ADDRESS => {
        self.task.take();
        None
      }
      KERN_SUCCESS => {
        let end = address.saturating_add(size);
        if end <= self.address {
          self.task.take();
          return None;
        }

        self.address = end;
        Some(Ok(Region::new(
          address as usize,
          end as usize,
          Permissions::from_native(info.protection, info.shared != 0),
          info.offset,
          Region::UNKNOWN_DEVICE,
          0,
          "",
          None,
        )))
      }
      _ => {
        warn!("mach_vm_region failed at {:#x}: {}", address, result);
        self.task.take();
        Some(Err(Error::MachCall(result)))
      }
    }
  }
}

impl std::iter::FusedIterator for MachRegions {}

/// The kernel's `VM_REGION_BASIC_INFO_COUNT_64`.
fn basic_info_count() -> mach_msg_type_number_t {
  (mem::size_of::<vm_region_basic_info_64>() / mem::size_of::<libc::c_int>()) as _
}

impl Permissions {
  fn from_native(protection: vm_prot_t, shared: bool) -> Self {
    const MAPPINGS: &[(vm_prot_t, Permissions)] = &[
      (VM_PROT_READ, Permissions::READ),
      (VM_PROT_WRITE, Permissions::WRITE),
      (VM_PROT_EXECUTE, Permissions::EXECUTE),
    ];

    let private = if shared {
      Permissions::NONE
    } else {
      Permissions::PRIVATE
    };

    MAPPINGS
      .iter()
      .filter(|(flag, _)| protection & *flag == *flag)
      .fold(private, |acc, (_, prot)| acc | *prot)
  }
}
