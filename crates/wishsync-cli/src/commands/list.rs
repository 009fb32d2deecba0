use std::path::Path;

use crate::commands::common::{
    format_wishlist_lines, list_wishlists, wishlist_to_list_item, WishlistListItem,
};
use crate::error::CliError;

pub async fn run_list(limit: usize, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    if limit == 0 {
        return Err(CliError::InvalidLimit);
    }

    let wishlists = list_wishlists(limit, db_path).await?;

    if as_json {
        let json_items = wishlists
            .iter()
            .map(|(wishlist, item_count)| wishlist_to_list_item(wishlist, *item_count))
            .collect::<Vec<WishlistListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if wishlists.is_empty() {
        println!("No wishlists synced yet.");
        return Ok(());
    }

    for line in format_wishlist_lines(&wishlists) {
        println!("{line}");
    }
    Ok(())
}
