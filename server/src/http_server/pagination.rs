/// Page-number pagination with the feed's default page size.
pub(crate) const DEFAULT_PAGE_SIZE: i64 = 6;

pub(crate) fn limit_offset(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let page = page.unwrap_or(1).max(1);

    (limit, (page - 1) * limit)
}
