use crate::model::issue::Issue;
use crate::model::status::Status;
use crate::store::IssueStore;

#[derive(Debug)]
pub struct Column<'a> {
    pub status: Status,
    pub issues: Vec<&'a Issue>,
}

/// Four-column view of the store, one column per status, in store order.
///
/// Holds no state of its own; rebuild it after every store change.
#[derive(Debug)]
pub struct BoardView<'a> {
    columns: Vec<Column<'a>>,
}

impl<'a> BoardView<'a> {
    pub fn project(store: &'a IssueStore) -> Self {
        let mut columns: Vec<Column<'a>> = Status::ALL
            .iter()
            .map(|&status| Column {
                status,
                issues: Vec::new(),
            })
            .collect();
        for issue in store.issues() {
            columns[issue.status.index()].issues.push(issue);
        }
        Self { columns }
    }

    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub fn column(&self, status: Status) -> &Column<'a> {
        &self.columns[status.index()]
    }

    pub fn issue_at(&self, status: Status, row: usize) -> Option<&'a Issue> {
        self.column(status).issues.get(row).copied()
    }

    /// Column and row of an issue.
    pub fn locate(&self, id: &str) -> Option<(Status, usize)> {
        self.columns.iter().find_map(|col| {
            col.issues
                .iter()
                .position(|i| i.id == id)
                .map(|row| (col.status, row))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::issue;

    fn store_of(statuses: &[Status]) -> IssueStore {
        let issues: Vec<Issue> = statuses
            .iter()
            .enumerate()
            .map(|(n, &s)| issue(&n.to_string(), s))
            .collect();
        let mut store = IssueStore::new();
        let count = issues.len();
        store.load(issues, count);
        store
    }

    #[test]
    fn every_issue_lands_in_exactly_one_column() {
        let store = store_of(&[
            Status::ToDo,
            Status::Done,
            Status::InProgress,
            Status::ToDo,
            Status::InReview,
            Status::Done,
        ]);
        let board = BoardView::project(&store);

        assert_eq!(board.columns().len(), 4);
        let total: usize = board.columns().iter().map(|c| c.issues.len()).sum();
        assert_eq!(total, store.issues().len());
        for issue in store.issues() {
            let hits: usize = board
                .columns()
                .iter()
                .map(|c| c.issues.iter().filter(|i| i.id == issue.id).count())
                .sum();
            assert_eq!(hits, 1, "issue {} appears {hits} times", issue.id);
            assert_eq!(board.locate(&issue.id).unwrap().0, issue.status);
        }
    }

    #[test]
    fn columns_keep_store_order() {
        let store = store_of(&[Status::ToDo, Status::Done, Status::ToDo, Status::ToDo]);
        let board = BoardView::project(&store);
        let ids: Vec<&str> = board
            .column(Status::ToDo)
            .issues
            .iter()
            .map(|i| i.id.as_str())
            .collect();
        assert_eq!(ids, ["0", "2", "3"]);
        assert_eq!(board.locate("3"), Some((Status::ToDo, 2)));
        assert_eq!(board.issue_at(Status::Done, 0).map(|i| i.id.as_str()), Some("1"));
        assert!(board.issue_at(Status::InReview, 0).is_none());
    }

    #[test]
    fn reprojection_follows_status_change() {
        let mut store = store_of(&[Status::ToDo]);
        store.set_status("0", Status::Done);
        let board = BoardView::project(&store);
        assert!(board.column(Status::ToDo).issues.is_empty());
        assert_eq!(board.locate("0"), Some((Status::Done, 0)));
    }
}
