//! End-to-end scenarios: userlib wrappers all the way into the simulated
//! kernel and back.

use core::alloc::{GlobalAlloc, Layout};
use std::collections::BTreeSet;
use std::ffi::CString;

use kestrel_abi::flags::{AccessMode, MmapFlags, MsgFlags, OpenAttr, OpenMode, ProcessFlags};
use kestrel_abi::signal::{SigSet, Signal, SigmaskOp};
use kestrel_abi::wire::{CpuMask, Pid, Whence};
use kestrel_abi::{Error, MAX_SYSCALL_NUMBER};
use userlib::allocator::UserHeap;
use userlib::fs::{self, File};
use userlib::ipc::MsgQueue;
use userlib::{arch, io, mem, process, signal};

use crate::harness::boot;
use crate::sim::{BREAK_CAPACITY, SIM_GROUP, SIM_PID};

#[test]
fn test_open_missing_path_is_not_found() {
    let (kernel, _guard) = boot();
    let result = File::open(c"/no/such/file", OpenMode::READ, OpenAttr::empty());
    assert_eq!(result.unwrap_err(), Error::NotFound);
    assert_eq!(kernel.open_files(), 0);
}

#[test]
fn test_file_write_seek_read() {
    let (kernel, _guard) = boot();
    let file = File::open(
        c"/data/log.txt",
        OpenMode::READ | OpenMode::WRITE,
        OpenAttr::AUTO_CREATE_FILE | OpenAttr::AUTO_CREATE_DIR,
    )
    .unwrap();
    assert!(file.fd().raw() >= 3);

    assert_eq!(file.write(b"hello kestrel"), Ok(13));
    assert_eq!(file.seek(-7, Whence::End), Ok(6));

    let mut buf = [0u8; 32];
    assert_eq!(file.read(&mut buf), Ok(7));
    assert_eq!(&buf[..7], b"kestrel");
    assert_eq!(file.read(&mut buf), Err(Error::Eof));

    assert_eq!(file.write_at(0, b"J"), Ok(1));
    assert_eq!(file.read_at(0, &mut buf[..5]), Ok(5));
    assert_eq!(&buf[..5], b"Jello");

    assert_eq!(file.seek(-1, Whence::Begin), Err(Error::Param));
    drop(file);
    assert_eq!(kernel.open_files(), 0);
    assert_eq!(kernel.file_contents("/data/log.txt").unwrap(), b"Jello kestrel");
}

#[test]
fn test_write_without_write_mode_is_refused() {
    let (_kernel, _guard) = boot();
    fs::create(c"/ro").unwrap();
    let file = File::open(c"/ro", OpenMode::READ, OpenAttr::empty()).unwrap();
    assert_eq!(file.write(b"x"), Err(Error::Permission));
    assert_eq!(file.close(), Ok(()));
}

#[test]
fn test_full_queue_with_no_block_is_busy() {
    let (_kernel, _guard) = boot();
    let queue = MsgQueue::create(2, 100).unwrap();
    queue.send(1, b"first", MsgFlags::NO_BLOCK).unwrap();
    queue.send(1, b"second", MsgFlags::NO_BLOCK).unwrap();

    assert_eq!(queue.send(1, b"third", MsgFlags::NO_BLOCK), Err(Error::Busy));
    assert_eq!(queue.send(1, b"third", MsgFlags::empty()), Err(Error::Interrupted));

    let mut buf = [0u8; 100];
    let len = queue.recv(1, &mut buf, MsgFlags::NO_BLOCK).unwrap();
    assert_eq!(&buf[..len], b"first");
    queue.send(1, b"third", MsgFlags::NO_BLOCK).unwrap();

    assert_eq!(queue.recv(1, &mut buf[..2], MsgFlags::NO_BLOCK), Err(Error::Buffer));
    assert_eq!(queue.send(1, &[0u8; 101], MsgFlags::NO_BLOCK), Err(Error::Size));
    assert_eq!(queue.close(), Ok(()));
}

#[test]
fn test_read_with_only_other_types_queued_continues() {
    let (_kernel, _guard) = boot();
    let queue = MsgQueue::create(2, 8).unwrap();
    queue.send(7, b"x", MsgFlags::NO_BLOCK).unwrap();

    let mut buf = [0u8; 8];
    assert_eq!(queue.recv(3, &mut buf, MsgFlags::NO_BLOCK_OTHER_TYPE), Err(Error::Continue));
    assert_eq!(queue.recv(7, &mut buf, MsgFlags::NO_BLOCK), Ok(1));
    assert_eq!(buf[0], b'x');
    assert_eq!(queue.recv(3, &mut buf, MsgFlags::NO_BLOCK), Err(Error::Busy));
}

#[test]
fn test_queue_rejects_zero_capacity() {
    let (_kernel, _guard) = boot();
    assert_eq!(MsgQueue::create(0, 16), Err(Error::Param));
    assert_eq!(MsgQueue::create(4, 0), Err(Error::Param));
}

#[test]
fn test_read_dir_yields_each_entry_once() {
    let (_kernel, _guard) = boot();
    fs::mkdir(c"/many").unwrap();

    // Long names so the listing spans several list_dir pages.
    let expected: BTreeSet<String> = (0..100)
        .map(|i| format!("entry-{:03}-with-a-longish-name", i))
        .collect();
    for name in &expected {
        let path = CString::new(format!("/many/{}", name)).unwrap();
        fs::create(&path).unwrap();
    }

    let dir = File::open(c"/many", OpenMode::READ, OpenAttr::empty()).unwrap();
    let mut seen = BTreeSet::new();
    let mut total = 0;
    for entry in dir.read_dir() {
        let name = String::from_utf8(entry.unwrap()).unwrap();
        assert!(seen.insert(name.clone()), "{} listed twice", name);
        total += 1;
    }
    assert_eq!(total, expected.len());
    assert_eq!(seen, expected);
}

#[test]
fn test_read_dir_of_empty_directory() {
    let (_kernel, _guard) = boot();
    fs::mkdir(c"/empty").unwrap();
    let dir = File::open(c"/empty", OpenMode::READ, OpenAttr::empty()).unwrap();
    assert_eq!(dir.read_dir().count(), 0);
}

#[test]
fn test_working_directory_resolves_relative_paths() {
    let (kernel, _guard) = boot();
    fs::mkdir(c"/home").unwrap();
    fs::chdir(c"home").unwrap();

    let mut buf = [0u8; 16];
    let len = fs::current_dir(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"/home");
    assert_eq!(fs::current_dir(&mut buf[..3]), Err(Error::Buffer));

    let notes = File::open(c"notes", OpenMode::WRITE, OpenAttr::AUTO_CREATE_FILE).unwrap();
    notes.write(b"remember").unwrap();
    drop(notes);
    assert_eq!(kernel.file_contents("/home/notes").unwrap(), b"remember");

    assert_eq!(fs::chdir(c"/nowhere"), Err(Error::NotFound));
    assert_eq!(fs::rmdir(c"/home"), Err(Error::Busy));
}

#[test]
fn test_namespace_operations() {
    let (kernel, _guard) = boot();
    fs::mkdir(c"/a").unwrap();
    fs::create(c"/a/file").unwrap();
    assert_eq!(fs::mkdir(c"/a"), Err(Error::Failed));
    assert_eq!(fs::mkdir(c"/x/y"), Err(Error::NotFound));

    fs::rename(c"/a", c"/b").unwrap();
    assert_eq!(fs::access(c"/a/file", AccessMode::EXISTS), Err(Error::NotFound));
    fs::access(c"/b/file", AccessMode::EXISTS).unwrap();

    let open = File::open(c"/b/file", OpenMode::READ, OpenAttr::empty()).unwrap();
    assert_eq!(fs::unlink(c"/b/file"), Err(Error::Busy));
    drop(open);
    fs::unlink(c"/b/file").unwrap();
    fs::rmdir(c"/b").unwrap();
    assert!(kernel.file_contents("/b/file").is_none());
}

#[test]
fn test_every_return_is_in_the_closed_set() {
    let (_kernel, _guard) = boot();
    // All-zero arguments: null pointers, descriptor 0, zero lengths.
    for nr in 0..=MAX_SYSCALL_NUMBER + 8 {
        let raw = unsafe { arch::trap(nr, [0; 6]) };
        assert!(
            raw >= 0 || Error::from_code(raw).is_some(),
            "syscall {} returned {} outside the error set",
            nr,
            raw
        );
    }
}

#[test]
fn test_unassigned_numbers_are_param() {
    let (_kernel, _guard) = boot();
    for nr in [10, 11, 26, 36, 58, 1 << 40] {
        assert_eq!(unsafe { arch::trap(nr, [0; 6]) }, Error::Param.code());
    }
}

#[test]
fn test_signals_respect_masks() {
    let (_kernel, _guard) = boot();

    signal::raise(Signal::User1, 7).unwrap();
    let (sig, info) = signal::wait().unwrap();
    assert_eq!(sig, Signal::User1);
    assert_eq!(info.value, 7);
    assert_eq!(signal::wait(), Err(Error::Interrupted));

    let blocked = signal::block(SigSet::EMPTY.with(Signal::User2)).unwrap();
    assert!(blocked.contains(Signal::User2));
    signal::raise(Signal::User2, 1).unwrap();
    assert_eq!(signal::wait(), Err(Error::Interrupted));

    let mut keep = SigSet(!SigSet::EMPTY.with(Signal::User2).0);
    signal::mask(SigmaskOp::And, None, Some(&mut keep), None).unwrap();
    assert!(!keep.contains(Signal::User2));
    assert_eq!(signal::wait().unwrap().0, Signal::User2);

    let mut ignore = SigSet::EMPTY.with(Signal::Pipe);
    signal::mask(SigmaskOp::Or, None, None, Some(&mut ignore)).unwrap();
    signal::raise(Signal::Pipe, 0).unwrap();
    assert_eq!(signal::wait(), Err(Error::Interrupted));

    let current = signal::current_mask().unwrap();
    assert!(current.ignore.contains(Signal::Pipe));
    assert!(!current.block.contains(Signal::User2));
}

#[test]
fn test_sigsend_to_process_and_group() {
    let (_kernel, _guard) = boot();

    signal::kill(Pid(SIM_PID), Signal::User1, 5).unwrap();
    let (sig, info) = signal::wait().unwrap();
    assert_eq!(sig, Signal::User1);
    assert_eq!(info.value, 5);

    signal::kill_group(SIM_GROUP, Signal::Alarm, 9).unwrap();
    let (sig, info) = signal::wait().unwrap();
    assert_eq!(sig, Signal::Alarm);
    assert_eq!(info.value, 9);

    assert_eq!(signal::kill(Pid(SIM_PID + 1), Signal::User1, 0), Err(Error::NotFound));
    assert_eq!(signal::kill_group(SIM_GROUP + 1, Signal::User1, 0), Err(Error::NotFound));
    assert_eq!(signal::wait(), Err(Error::Interrupted));
}

#[test]
fn test_sigsend_to_blocked_signal_stays_pending() {
    let (_kernel, _guard) = boot();
    signal::block(SigSet::EMPTY.with(Signal::User2)).unwrap();

    signal::kill(Pid(SIM_PID), Signal::User2, 3).unwrap();
    signal::kill_group(SIM_GROUP, Signal::User2, 4).unwrap();
    assert_eq!(signal::wait(), Err(Error::Interrupted));

    let mut none = SigSet::EMPTY;
    signal::mask(SigmaskOp::Set, None, Some(&mut none), None).unwrap();
    assert_eq!(signal::wait().unwrap().1.value, 3);
    assert_eq!(signal::wait().unwrap().1.value, 4);
    assert_eq!(signal::wait(), Err(Error::Interrupted));
}

#[test]
fn test_cpumask_round_trip() {
    let (_kernel, _guard) = boot();
    assert_eq!(process::cpumask(), Ok(CpuMask::ALL));

    let mask = CpuMask::from_bits(0b1010 | 1 << 100);
    process::set_cpumask(mask).unwrap();
    assert_eq!(process::cpumask(), Ok(mask));
    assert_eq!(process::set_cpumask(CpuMask::NONE), Err(Error::Param));
}

#[test]
fn test_program_break() {
    let (kernel, _guard) = boot();
    let base = kernel.break_base();

    let first = mem::sbrk(4096).unwrap();
    assert_eq!(first.as_ptr() as usize, base);
    let second = mem::sbrk(0).unwrap();
    assert_eq!(second.as_ptr() as usize, base + 4096);

    assert_eq!(mem::sbrk(-(1 << 30)), Err(Error::Param));
    assert_eq!(mem::brk(base + BREAK_CAPACITY + 1), Err(Error::Failed));
    mem::brk(base).unwrap();
    assert_eq!(mem::sbrk(0).unwrap().as_ptr() as usize, base);
}

#[test]
fn test_user_heap_grows_through_sbrk() {
    let (kernel, _guard) = boot();
    let base = kernel.break_base();
    let heap = UserHeap::new();

    let layout = Layout::from_size_align(256, 16).unwrap();
    let ptr = unsafe { heap.alloc(layout) };
    assert!(!ptr.is_null());
    let addr = ptr as usize;
    assert!(addr >= base && addr + 256 <= base + BREAK_CAPACITY);

    unsafe {
        ptr.write_bytes(0xAB, 256);
        assert_eq!(*ptr.add(255), 0xAB);
    }
    assert!(heap.size() > 0);
}

#[test]
fn test_file_mapping() {
    let (_kernel, _guard) = boot();
    let file = File::open(c"/blob", OpenMode::READ | OpenMode::WRITE, OpenAttr::AUTO_CREATE_FILE).unwrap();
    file.write(b"mapped bytes").unwrap();

    let len = 16;
    let ptr = mem::map_file(file.fd(), 7, len, MmapFlags::READ).unwrap();
    let view = unsafe { core::slice::from_raw_parts(ptr.as_ptr(), len) };
    assert_eq!(&view[..5], b"bytes");
    assert!(view[5..].iter().all(|b| *b == 0));

    unsafe {
        assert_eq!(mem::unmap(ptr, len), Ok(()));
        assert_eq!(mem::unmap(ptr, len), Err(Error::Param));
    }
    assert_eq!(mem::map_anonymous(0, MmapFlags::READ), Err(Error::Param));
}

#[test]
fn test_log_and_console_output() {
    let (kernel, _guard) = boot();
    io::debug_print("hello from userspace").unwrap();
    io::println("to stdout");
    io::eprint("to stderr");

    assert_eq!(kernel.log_lines(), ["hello from userspace"]);
    assert_eq!(kernel.console(), b"to stdout\nto stderr");

    userlib::print!("x = {}", 5);
    userlib::println!(", y = {}", "six");
    assert_eq!(kernel.console(), b"to stdout\nto stderrx = 5, y = six\n");

    let long = "x".repeat(2048);
    assert_eq!(io::debug_print(&long), Err(Error::Buffer));
}

#[test]
fn test_unimplemented_calls_fail_cleanly() {
    let (_kernel, _guard) = boot();
    assert_eq!(process::spawn(c"/bin/sh", &[c"sh"], &[], ProcessFlags::empty()), Err(Error::Failed));
    assert_eq!(process::sleep_ms(10), Ok(()));
}
