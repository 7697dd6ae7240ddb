/*!

This is the long-form manual for `culture_index` and `cindex`.

## Input formats

The following response formats are supported:
* `csv` Comma Separated Values, one answer per line
* `csv_wide` Comma Separated Values, one respondent per line
* `forms` Excel (.xlsx) exports from Microsoft Forms and Google Forms
* `json` archives produced by survey collection services

### `csv`

One answer per line. Each line carries the respondent, the question code
and the answer, in columns that can be remapped in the configuration:

```text
email,question,answer
anna@acme.org,q1,Agree
anna@acme.org,q2,Disagree
bob@acme.org,q1,4
```

The answer cell may hold either a scale label or a number between 1 and 5.
Lines with an empty answer cell are recorded as unanswered, which makes the
submission incomplete. The default column layout is `respondent, question,
answer`; use `respondentColumnIndex`, `questionColumnIndex` and
`answerColumnIndex` for other layouts.

### `csv_wide`

One respondent per line and one question per column. The first row names
the questions, either by their catalog code or by their full statement
text:

```text
email,q1,q2,q3
anna@acme.org,Agree,Disagree,Strongly agree
bob@acme.org,4,2,5
```

The columns holding answers start at `firstAnswerColumnIndex` (default: the
second column). The respondent is read from `respondentColumnIndex`
(default: the first column).

### `forms`

Excel exports from Microsoft Forms or Google Forms, with one respondent per
row. Questions are matched against the header by catalog code first, then
by full statement text, so the export can be used without renaming any
column. Columns that match no catalog question (timestamps, emails and
other metadata added by the service) are simply not treated as answers.

When `respondentColumnIndex` is not set, respondents are given stable
generated identifiers derived from the file name and the row number.

If the workbook has several worksheets, name the one to read with
`excelWorksheetName` (or the `--excel-worksheet-name` flag).

### `json`

An array of submissions, each with a `respondent` field and an `answers`
object keyed by question code:

```json
[
  {
    "respondent": "anna@acme.org",
    "answers": { "q1": "Agree", "q2": 2, "q3": "Strongly agree" }
  }
]
```

String values are matched against the scale labels, numbers are taken as
direct picks. A string holding only digits is read as a pick, consistently
with the CSV readers. `null` answers are recorded as unanswered.

## The question catalog

The catalog lists every statement of the questionnaire with its code and
its thematic axis. Two formats are accepted, chosen with the `provider`
key (`excel` or `csv`):

```text
code,axis,text
q1,Audacity,New ideas are welcome here
q2,Audacity,We experiment without fear of failure
q3,Trust,Mistakes are discussed openly
```

The default layout is `code, axis, text` with a header row; the column
indices and the first data row can be remapped (`codeColumnIndex`,
`axisColumnIndex`, `textColumnIndex`, `firstQuestionRowIndex`). Codes must
be unique and neither codes nor axes may be blank. An empty catalog is
rejected at load time.

Axes appear in the output in catalog order.

## Configuration file

The configuration is a single JSON document. Column and row indices are
1-based, and columns also accept Excel-style letters (`"A"` is the first
column). A complete example:

```json
{
  "outputSettings": {
    "surveyName": "Culture check 2024",
    "surveyDate": "2024-06-01",
    "organization": "Acme",
    "outputDirectory": "out"
  },
  "questionCatalog": {
    "provider": "csv",
    "filePath": "catalog.csv"
  },
  "responseSources": [
    {
      "provider": "csv",
      "filePath": "responses.csv",
      "respondentColumnIndex": 1,
      "questionColumnIndex": 2,
      "answerColumnIndex": "C"
    }
  ],
  "answerLabels": [
    "Strongly disagree",
    "Disagree",
    "Neutral",
    "Agree",
    "Strongly agree"
  ],
  "maturityTiers": [
    { "label": "Emerging", "min": 0, "max": 49.9,
      "description": "Culture work is just starting; wins are individual, not systemic" },
    { "label": "Developing", "min": 50, "max": 74.9,
      "description": "Practices are taking hold but depend on a few champions" },
    { "label": "Advanced", "min": 75, "max": 100,
      "description": "The culture sustains itself across teams" }
  ],
  "roster": {
    "filePath": "roster.csv",
    "unknownRespondentPolicy": "skip"
  },
  "resultsFile": "results.jsonl"
}
```

All paths are resolved relative to the directory of the configuration
file.

### Maturity tiers

Each row covers an inclusive range of the 0-100 global index. Overlapping
rows are a configuration error and refuse to load. Holes are tolerated with
a warning: an index falling in a hole is reported as not evaluated. When
`maturityTiers` is omitted, the built-in three-tier table shown above is
used.

### Answer labels

`answerLabels` replaces the default English scale with five custom labels
in ascending order of agreement, for translated questionnaires or house
wordings. Matching against answers is exact: trailing spaces or different
casing in the source file will not match. The labels must be distinct and
non-empty. The same set can be passed on the command line with repeated
`--labels` flags.

### Roster

When a roster is configured, only listed respondents are tabulated. The
roster file is a CSV whose first column holds the respondent identifiers
(`respondentColumnIndex` and `firstRowIndex` can remap this, the default
layout being a header row followed by one identifier per line).
`unknownRespondentPolicy` is either `skip` (default: log and ignore
unlisted respondents) or `reject` (fail the run).

### Results file

When `resultsFile` is set, every completed submission is appended to that
file as one JSON object per line. The file is append-only and survives
across runs, so successive campaigns accumulate in place. Incomplete
submissions are never appended.

## Output

The summary is a single JSON document:

```json
{
  "cohort": {
    "axes": { "Audacity": 3.0, "Trust": 5.0 },
    "globalIndex": 80.0,
    "maturity": "Advanced",
    "respondents": 1
  },
  "config": {
    "date": "2024-06-01",
    "organization": "Acme",
    "scale": ["Strongly disagree", "Disagree", "Neutral", "Agree", "Strongly agree"],
    "survey": "Culture check 2024"
  },
  "results": [
    {
      "axes": { "Audacity": 3.0, "Trust": 5.0 },
      "globalIndex": 80.0,
      "maturity": "Advanced",
      "respondent": "anna@acme.org",
      "scores": { "q1": 4, "q2": 2, "q3": 5 },
      "timestamp": "2024-06-03T09:12:44Z"
    },
    {
      "incomplete": ["q3"],
      "respondent": "bob@acme.org"
    }
  ]
}
```

A respondent that did not answer every question appears as an `incomplete`
entry naming the unanswered codes and does not contribute to the cohort
block. When no submission is complete, `cohort` is `null`.

The summary is written to `--out` (a path or `stdout`), or into the
configured `outputDirectory`, or printed to the standard output when
neither is set.

## Checking against a reference

`--reference` compares the tabulated summary against a previously saved
one and fails with a line-by-line diff when they differ. Timestamps are
ignored by the comparison. This is how the test suite validates whole
runs, and it is handy for re-running a campaign after an engine upgrade.

*/
