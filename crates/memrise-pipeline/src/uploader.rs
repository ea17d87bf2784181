use crate::backend::Platform;
use memrise_model::{AudioClip, Result, Word};

/// Replace a word's audio with `clip`.
///
/// Existing attachments are deleted first, last one first, so positional
/// file ids of the remaining ones stay valid. Each successful delete is
/// removed from `word.attachments`. If a delete fails the upload is not
/// attempted, leaving the word with its remaining audio rather than a
/// duplicate. Returns how many attachments were removed.
pub async fn replace_audio<P>(platform: &P, word: &mut Word, clip: &AudioClip) -> Result<usize>
where
    P: Platform + ?Sized,
{
    let mut removed = 0;
    while let Some(attachment) = word.attachments.last().cloned() {
        tracing::info!(thing_id = word.thing_id, file_id = %attachment, "Deleting audio in word '{}'", word.target_text);
        platform.delete_audio(word, &attachment).await?;
        word.attachments.pop();
        removed += 1;
    }

    tracing::info!(thing_id = word.thing_id, bytes = clip.len(), "Uploading audio for word '{}'", word.target_text);
    platform.upload_audio(word, clip).await?;
    Ok(removed)
}
