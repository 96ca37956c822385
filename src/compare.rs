//! Byte-for-byte content comparison between two abstract files.

use crate::{AfsPath, FsError, ProgressFn, ReadStream};

/// Compare the contents of two files byte for byte.
///
/// Opens independent read streams on both paths and feeds two growable
/// buffers with independently adaptive chunk sizes. Each round grows the
/// smaller-buffered side by one chunk, compares only the newly-overlapping
/// range, and trims confirmed-equal bytes — so peak memory stays around one
/// adaptive block per stream regardless of file size, and the first
/// mismatching byte returns `false` without reading the rest of either
/// file. A stream hitting end-of-file while the other still holds bytes
/// means the sizes differ, which is also `false`.
///
/// Progress is reported per read as half the byte delta, with the
/// remainder carried forward, so the cumulative reported amount matches
/// the logical number of compared bytes rather than double-counting the
/// two streams.
///
/// # Errors
///
/// - any stream failure on either side
/// - any error raised by `progress` (aborts the comparison)
pub fn files_have_same_content(
    lhs: &AfsPath,
    rhs: &AfsPath,
    progress: Option<&mut ProgressFn<'_>>,
) -> Result<bool, FsError> {
    let mut left = lhs.backend().open_read(lhs.item())?;
    let mut right = rhs.backend().open_read(rhs.item())?;
    streams_have_same_content(left.as_mut(), right.as_mut(), progress)
}

/// Stream-level comparison core; see [`files_have_same_content`].
pub(crate) fn streams_have_same_content(
    left: &mut dyn ReadStream,
    right: &mut dyn ReadStream,
    mut progress: Option<&mut ProgressFn<'_>>,
) -> Result<bool, FsError> {
    let mut buf_left: Vec<u8> = Vec::new();
    let mut buf_right: Vec<u8> = Vec::new();
    let mut eof_left = false;
    let mut eof_right = false;
    let mut carry: i64 = 0;

    loop {
        // Grow whichever side has fewer buffered bytes and can still read;
        // no read ever runs ahead of what the next comparison needs.
        if !eof_left && (buf_left.len() <= buf_right.len() || eof_right) {
            eof_left = read_chunk(left, &mut buf_left, progress.as_deref_mut(), &mut carry)?;
        } else if !eof_right {
            eof_right = read_chunk(right, &mut buf_right, progress.as_deref_mut(), &mut carry)?;
        }

        let common = buf_left.len().min(buf_right.len());
        if buf_left[..common] != buf_right[..common] {
            return Ok(false);
        }
        buf_left.drain(..common);
        buf_right.drain(..common);

        if eof_left && eof_right {
            return Ok(buf_left.is_empty() && buf_right.is_empty());
        }
        // One side fully consumed while the other still holds unmatched
        // bytes: the files have different lengths.
        if (eof_left && !buf_right.is_empty()) || (eof_right && !buf_left.is_empty()) {
            return Ok(false);
        }
    }
}

/// Append one adaptive chunk to `buf`; `Ok(true)` means end of stream.
fn read_chunk(
    stream: &mut dyn ReadStream,
    buf: &mut Vec<u8>,
    mut progress: Option<&mut ProgressFn<'_>>,
    carry: &mut i64,
) -> Result<bool, FsError> {
    let want = stream.block_size().max(1);
    let old_len = buf.len();
    buf.resize(old_len + want, 0);
    let read = match stream.read(&mut buf[old_len..]) {
        Ok(n) => n,
        Err(e) => {
            buf.truncate(old_len);
            return Err(e);
        }
    };
    buf.truncate(old_len + read);

    if let Some(report) = progress.as_mut() {
        let total = read as i64 + *carry;
        report(total / 2)?;
        *carry = total % 2;
    }
    Ok(read == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileId;
    use rstest::rstest;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory stream with a fixed chunk size and a read counter.
    struct ScriptedStream {
        data: Vec<u8>,
        pos: usize,
        chunk: usize,
        reads: Arc<AtomicUsize>,
    }

    impl ScriptedStream {
        fn new(data: Vec<u8>, chunk: usize) -> Self {
            Self {
                data,
                pos: 0,
                chunk,
                reads: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn read_counter(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.reads)
        }
    }

    impl ReadStream for ScriptedStream {
        fn block_size(&self) -> usize {
            self.chunk
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, FsError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            let n = buf.len().min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }

        fn file_size(&self) -> u64 {
            self.data.len() as u64
        }

        fn modification_time(&self) -> i64 {
            0
        }

        fn file_id(&self) -> FileId {
            FileId::UNKNOWN
        }
    }

    fn compare(left: Vec<u8>, right: Vec<u8>, chunk: usize) -> bool {
        let mut l = ScriptedStream::new(left, chunk);
        let mut r = ScriptedStream::new(right, chunk);
        streams_have_same_content(&mut l, &mut r, None).unwrap()
    }

    const CHUNK: usize = 64;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(CHUNK - 1)]
    #[case(CHUNK)]
    #[case(CHUNK + 1)]
    #[case(10 * CHUNK)]
    fn identical_inputs_compare_equal(#[case] len: usize) {
        assert!(compare(pattern(len), pattern(len), CHUNK));
    }

    #[rstest]
    #[case(1)]
    #[case(CHUNK)]
    #[case(10 * CHUNK)]
    fn truncating_one_byte_compares_unequal(#[case] len: usize) {
        let full = pattern(len);
        let mut short = full.clone();
        short.pop();
        assert!(!compare(full.clone(), short.clone(), CHUNK));
        assert!(!compare(short, full, CHUNK));
    }

    #[test]
    fn flipping_last_byte_compares_unequal() {
        let left = pattern(10 * CHUNK);
        let mut right = left.clone();
        *right.last_mut().unwrap() ^= 0xFF;
        assert!(!compare(left, right, CHUNK));
    }

    #[test]
    fn mismatch_short_circuits_remaining_reads() {
        // Mismatch in the very first chunk of a long input: neither stream
        // may be read past the chunk containing the mismatch.
        let left = pattern(100 * CHUNK);
        let mut right = left.clone();
        right[3] ^= 0xFF;

        let mut l = ScriptedStream::new(left, CHUNK);
        let mut r = ScriptedStream::new(right, CHUNK);
        let l_reads = l.read_counter();
        let r_reads = r.read_counter();

        assert!(!streams_have_same_content(&mut l, &mut r, None).unwrap());
        assert_eq!(l_reads.load(Ordering::SeqCst), 1);
        assert_eq!(r_reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn different_chunk_sizes_still_compare_equal() {
        let data = pattern(1000);
        let mut l = ScriptedStream::new(data.clone(), 7);
        let mut r = ScriptedStream::new(data, 131);
        assert!(streams_have_same_content(&mut l, &mut r, None).unwrap());
    }

    #[test]
    fn progress_reports_half_of_total_bytes_read() {
        let data = pattern(3 * CHUNK + 5);
        let total_len = data.len() as i64;
        let mut l = ScriptedStream::new(data.clone(), CHUNK);
        let mut r = ScriptedStream::new(data, CHUNK);

        let mut reported = 0i64;
        let mut progress = |delta: i64| -> Result<(), FsError> {
            reported += delta;
            Ok(())
        };
        assert!(streams_have_same_content(&mut l, &mut r, Some(&mut progress)).unwrap());
        // Both streams were read fully; the halving convention keeps the
        // cumulative total at one file's worth (give or take the carry).
        assert!((reported - total_len).abs() <= 1, "reported {reported}");
    }

    #[test]
    fn progress_abort_propagates() {
        let data = pattern(10 * CHUNK);
        let mut l = ScriptedStream::new(data.clone(), CHUNK);
        let mut r = ScriptedStream::new(data, CHUNK);

        let mut progress = |_delta: i64| -> Result<(), FsError> {
            Err(FsError::Aborted {
                reason: "user cancel".into(),
            })
        };
        let err = streams_have_same_content(&mut l, &mut r, Some(&mut progress)).unwrap_err();
        assert!(matches!(err, FsError::Aborted { .. }));
    }
}
