/*!

This is the long-form manual for `poll_insights` and `pollboard`.

## Response records

One record is one poll answer event. The collection sheet exports records
with the following columns:

| Column       | Content                                   |
|--------------|-------------------------------------------|
| Timestamp    | ISO-8601 submission time                  |
| Poll ID      | `poll1`, `poll2`, ...                     |
| Response     | recorded value of the selected option     |
| Question     | full question text                        |
| Category     | poll category label                       |
| Session ID   | respondent session identifier             |
| User Country | country reported for the respondent       |

Any column may be missing or empty for a given record. The readers normalize
missing fields to the empty string before the records reach the analysis
functions, so a partially filled sheet never aborts a run.

Three poll ids carry the demographic questions and feed the demographic
breakdown: `poll17` (age group), `poll16` (residence) and `poll18`
(political affiliation). Records for every other poll id are ignored by that
breakdown while still counting toward the totals, the per-poll and the
per-country breakdowns.

## Poll definition documents

Polls are described in a markdown-like document, one section per poll:

```text
## Poll 3:
Budget priorities
**Category:** Governance
**Question:** Where should the budget go first?
**Options:**
- Education (60%)
- Roads (40%)
---
```

* A section starts at a `## Poll <N>:` heading; `<N>` is the numeric poll
  identifier and everything before the first heading is ignored.
* The first non-blank line of a section is the title. Text after the colon
  on the heading line counts as the first line.
* `**Category:**` and `**Question:**` lines supply the category and the
  question.
* `**Options:**` opens the option list. Option lines look like
  `- <text> (<percent>%)` and the list ends at a `---` line, a blank line or
  any line that is not an option.
* A section without a question or without at least one option is dropped
  silently. This is the supported way to park a draft poll in the document.

The percentage is display data recorded in the document. It seeds the static
page and is never recomputed from the response corpus.

## Page generation

The renderer produces one HTML fragment per poll and splices the
concatenation into the target page between two marker lines:

```html
<!-- POLLS START -->
<!-- POLLS END -->
```

Everything strictly between the first occurrence of each marker is replaced;
the markers themselves stay. When either marker is missing the page is left
untouched and the operation fails, so a half-written page is never produced.

Vote counts on the generated page all start at `0 votes`. Live tallies are
filled in by the page's own data path at display time; the generator only
decides which polls exist and what their options are.

*/
